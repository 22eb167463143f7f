pub mod u501_import_components_csv;
