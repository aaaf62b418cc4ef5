// ==========================================
// 课程模板实例化引擎 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 班级采纳课程时，将课程模板物化为班级实例并记录溯源
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 模板实例化
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AssessmentType, ModuleItemKind, PrerequisitePolicy, SubmissionMode};

// 领域实体
pub use domain::{
    Assessment, AssessmentTemplate, Class, Course, Module, ModuleItem, ModuleItemTemplate,
    ModuleTemplate,
};

// 引擎
pub use engine::{AdoptionReport, CurriculumInstantiator, CurriculumRepositories, EngineError};

// API
pub use api::{AdoptionApi, ModuleApi, ProvenanceApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "课程模板实例化引擎";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";
