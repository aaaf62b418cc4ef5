// ==========================================
// 课程模板实例化引擎 - 查找表构建 (Lookup Map Builder)
// ==========================================
// 由溯源映射构建 template_id → instance_id 的内存索引
// 查找表绑定单个班级，用类型区分测评/模块两类引用，
// 模块克隆器的签名因此显式依赖测评克隆的产物
// ==========================================

use crate::domain::provenance::{AssessmentTemplateMapping, ModuleTemplateMapping};
use std::collections::HashMap;
use std::marker::PhantomData;

/// 测评引用标记
#[derive(Debug, Clone)]
pub enum AssessmentRef {}

/// 模块引用标记
#[derive(Debug, Clone)]
pub enum ModuleRef {}

/// 班级作用域内的 模板 ID → 实例 ID 查找表
#[derive(Debug, Clone)]
pub struct InstanceLookup<K> {
    class_id: String,
    entries: HashMap<String, String>,
    _kind: PhantomData<K>,
}

/// 测评模板 ID → 测评实例 ID
pub type AssessmentLookup = InstanceLookup<AssessmentRef>;

/// 模块模板 ID → 模块实例 ID
pub type ModuleLookup = InstanceLookup<ModuleRef>;

impl<K> InstanceLookup<K> {
    /// 创建空查找表
    pub fn empty(class_id: &str) -> Self {
        Self {
            class_id: class_id.to_string(),
            entries: HashMap::new(),
            _kind: PhantomData,
        }
    }

    /// 登记一条映射；同一模板重复出现时后者覆盖前者
    pub(crate) fn record(&mut self, template_id: &str, instance_id: &str) {
        if let Some(previous) = self
            .entries
            .insert(template_id.to_string(), instance_id.to_string())
        {
            tracing::debug!(
                class_id = %self.class_id,
                template_id,
                previous_instance_id = %previous,
                instance_id,
                "同一模板在班级内存在多个实例，使用较新的实例"
            );
        }
    }

    /// 解析模板 ID
    pub fn resolve(&self, template_id: &str) -> Option<&str> {
        self.entries.get(template_id).map(String::as_str)
    }

    /// 查找表所属班级
    pub fn class_id(&self) -> &str {
        &self.class_id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AssessmentLookup {
    /// 从测评溯源构建（忽略其他班级的行）
    pub fn from_mappings(class_id: &str, mappings: &[AssessmentTemplateMapping]) -> Self {
        let mut lookup = Self::empty(class_id);
        for mapping in mappings.iter().filter(|m| m.class_id == class_id) {
            lookup.record(&mapping.assessment_template_id, &mapping.assessment_id);
        }
        lookup
    }
}

impl ModuleLookup {
    /// 从模块溯源构建（忽略其他班级的行）
    pub fn from_mappings(class_id: &str, mappings: &[ModuleTemplateMapping]) -> Self {
        let mut lookup = Self::empty(class_id);
        for mapping in mappings.iter().filter(|m| m.class_id == class_id) {
            lookup.record(&mapping.module_template_id, &mapping.module_id);
        }
        lookup
    }
}
