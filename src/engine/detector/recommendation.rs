// ==========================================
// 钢结构加工运营引擎 - 建议措施模板表
// ==========================================
// 键: (类别, 严重度)；参数只来自检测规则的输入
// 红线: 不接入任何生成式步骤，输出可被原样引用
// ==========================================

use crate::domain::types::{IndicatorCategory, Severity};

/// 模板参数
#[derive(Debug, Clone, Default)]
pub struct TemplateParams<'a> {
    /// 主体（工作单元/资源/项目名称）
    pub subject: &'a str,
    /// 相关对象（上游采购单元、受影响单元数等）
    pub related: &'a str,
}

/// 建议措施
pub fn recommendation(
    category: IndicatorCategory,
    severity: Severity,
    params: &TemplateParams<'_>,
) -> String {
    let subject = params.subject;
    let related = params.related;

    use IndicatorCategory::*;
    use Severity::*;
    match (category, severity) {
        (TaskDelay, Critical) => format!(
            "Start {} immediately or re-baseline its plan; confirm the owner today.",
            subject
        ),
        (TaskDelay, High) => format!(
            "Confirm that {} can start as planned; resolve open prerequisites now.",
            subject
        ),
        (TaskDelay, Medium | Low) => format!(
            "Check readiness of {} before its planned start.",
            subject
        ),

        (CascadeRisk, Critical) => format!(
            "Escalate {}: it holds up {} downstream units; assign extra resources or re-sequence the chain.",
            subject, related
        ),
        (CascadeRisk, High) => format!(
            "Prioritize completion of {} to release {} downstream units.",
            subject, related
        ),
        (CascadeRisk, Medium | Low) => format!(
            "Monitor {} and notify owners of {} downstream units.",
            subject, related
        ),

        (ResourceOverload, Critical) => format!(
            "Add capacity to {} (overtime or subcontracting) or defer non-critical work; load is at {}.",
            subject, related
        ),
        (ResourceOverload, High) => format!(
            "Rebalance work away from {} (load at {}) to avoid slippage this week.",
            subject, related
        ),
        (ResourceOverload, Medium | Low) => format!(
            "Review this week's assignments for {} (load at {}).",
            subject, related
        ),

        (ProcurementRisk, Critical) => format!(
            "Expedite upstream procurement ({}) for {} or reschedule production.",
            related, subject
        ),
        (ProcurementRisk, High) => format!(
            "Expedite upstream procurement ({}) for {}; confirm delivery dates with suppliers.",
            related, subject
        ),
        (ProcurementRisk, Medium | Low) => format!(
            "Confirm delivery status of upstream procurement ({}) for {}.",
            related, subject
        ),

        (ScheduleSlip, Critical) => format!(
            "Recovery plan required for {}: progress trails plan by {}.",
            subject, related
        ),
        (ScheduleSlip, High) => format!(
            "Add resources to {} to close a progress gap of {}.",
            subject, related
        ),
        (ScheduleSlip, Medium | Low) => format!(
            "Track {} closely; progress trails plan by {}.",
            subject, related
        ),
    }
}
