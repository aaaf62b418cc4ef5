#![allow(dead_code)]

pub mod course_builder;
pub mod mock_config;
