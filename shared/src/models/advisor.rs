//! AI advisor models: chat, reports and health analysis

use serde::{Deserialize, Serialize};

/// Author of a chat message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

impl std::str::FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(ChatRole::User),
            "model" => Ok(ChatRole::Model),
            other => Err(format!("unknown chat role: {}", other)),
        }
    }
}

/// The report types the advisor can generate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ReportType {
    Overview,
    Performance,
    HarvestReady,
    Profit,
    Inventory,
}

impl ReportType {
    /// Fixed Vietnamese title shown above the generated report body
    pub fn title(&self) -> &'static str {
        match self {
            ReportType::Overview => "Báo cáo Tổng quan",
            ReportType::Performance => "Báo cáo Hiệu suất",
            ReportType::HarvestReady => "Báo cáo Lồng Sẵn sàng Thu hoạch",
            ReportType::Profit => "Báo cáo Lợi nhuận",
            ReportType::Inventory => "Báo cáo Quản lý Kho (Mô phỏng)",
        }
    }
}

/// Overall verdict of an AI health analysis
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HealthStatus {
    #[serde(rename = "KHỎE MẠNH")]
    Healthy,
    #[serde(rename = "CẦN CHÚ Ý")]
    NeedsAttention,
    #[serde(rename = "NGUY CƠ CAO")]
    HighRisk,
}

/// Display color paired with a health status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Green,
    Yellow,
    Red,
}

/// One observation inside a health report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthObservation {
    pub text: String,
    pub is_positive: bool,
}

/// Structured result of an AI health check on a single cage
///
/// Field names follow the JSON schema the model is constrained with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AIHealthReport {
    pub health_status: HealthStatus,
    pub status_color: StatusColor,
    pub summary: String,
    pub key_observations: Vec<HealthObservation>,
    pub recommendation: String,
}

impl AIHealthReport {
    /// Canned report returned when the AI service cannot be reached
    pub fn connection_failure() -> Self {
        Self {
            health_status: HealthStatus::HighRisk,
            status_color: StatusColor::Red,
            summary: "Không thể thực hiện phân tích AI.".to_string(),
            key_observations: vec![
                HealthObservation {
                    text: "Đã xảy ra lỗi khi kết nối với máy chủ AI.".to_string(),
                    is_positive: false,
                },
                HealthObservation {
                    text: "Vui lòng kiểm tra lại kết nối mạng hoặc thử lại sau.".to_string(),
                    is_positive: false,
                },
            ],
            recommendation: "Nếu sự cố tiếp diễn, vui lòng liên hệ với bộ phận hỗ trợ kỹ thuật."
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_titles() {
        assert_eq!(ReportType::Overview.title(), "Báo cáo Tổng quan");
        assert_eq!(
            ReportType::HarvestReady.title(),
            "Báo cáo Lồng Sẵn sàng Thu hoạch"
        );
        assert_eq!(
            ReportType::Inventory.title(),
            "Báo cáo Quản lý Kho (Mô phỏng)"
        );
    }

    #[test]
    fn test_report_type_wire_names_are_kebab_case() {
        let json = serde_json::to_value(ReportType::HarvestReady).unwrap();
        assert_eq!(json, "harvest-ready");
        let parsed: ReportType = serde_json::from_value(serde_json::json!("overview")).unwrap();
        assert_eq!(parsed, ReportType::Overview);
    }

    #[test]
    fn test_health_report_uses_schema_field_names() {
        let report = AIHealthReport::connection_failure();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["healthStatus"], "NGUY CƠ CAO");
        assert_eq!(json["statusColor"], "red");
        assert_eq!(json["keyObservations"][0]["isPositive"], false);
    }

    #[test]
    fn test_connection_failure_report_is_high_risk() {
        let report = AIHealthReport::connection_failure();
        assert_eq!(report.health_status, HealthStatus::HighRisk);
        assert_eq!(report.status_color, StatusColor::Red);
        assert_eq!(report.key_observations.len(), 2);
        assert!(report.key_observations.iter().all(|o| !o.is_positive));
    }
}
