//! DTO и агрегаты, общие для backend склада и его клиентов

pub mod domain;
pub mod usecases;
