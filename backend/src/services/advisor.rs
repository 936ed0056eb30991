//! AI advisor service
//!
//! Chat sessions, generated reports and per-cage health checks. Advisory
//! failures never surface as HTTP errors: chat falls back to a canned reply,
//! reports to an error paragraph, health checks to a canned report.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::cage::CageService;
use super::harvest::HarvestService;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::external::advisor::{Content, GeminiClient};
use shared::format::format_vnd;
use shared::lifecycle::farming_days;
use shared::models::{AIHealthReport, Cage, ChatRole, HarvestedCage, ReportType};

/// Canned reply returned when the chat backend cannot be reached
const CHAT_FALLBACK: &str =
    "Xin lỗi, đã có lỗi xảy ra khi kết nối với AI. Vui lòng thử lại sau.";

/// Greeting persisted as the first model turn of every session
const CHAT_GREETING: &str = "Xin chào! Tôi là Cố vấn AI của bạn. Hãy hỏi tôi bất cứ điều gì \
     về trang trại hoặc chọn một gợi ý bên dưới.";

const REPORT_FAILURE_HTML: &str =
    r#"<p class="text-red-500">Đã xảy ra lỗi khi tạo báo cáo. Vui lòng thử lại.</p>"#;

/// AI advisor service
#[derive(Clone)]
pub struct AdvisorService {
    db: PgPool,
    client: Option<GeminiClient>,
}

/// Input for sending a chat message
#[derive(Debug, Deserialize)]
pub struct SendMessageInput {
    pub message: String,
}

/// Input for generating a report
#[derive(Debug, Deserialize)]
pub struct GenerateReportInput {
    pub report_type: ReportType,
}

/// A freshly started chat session
#[derive(Debug, Serialize)]
pub struct ChatSessionResponse {
    pub session_id: Uuid,
    pub greeting: String,
}

/// One whole chat reply
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

/// A generated report
#[derive(Debug, Serialize)]
pub struct Report {
    pub title: String,
    pub content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatCageSnapshot {
    id: String,
    current_weight: i32,
    progress: i32,
    farming_days: i64,
    total_cost: Decimal,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatHarvestedSnapshot {
    id: String,
    final_weight: i32,
    profit: Decimal,
    revenue: Decimal,
    total_cost: Decimal,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportCageSnapshot {
    id: String,
    current_weight: i32,
    farming_days: i64,
    /// Grams gained per farming day, already formatted to two decimals
    growth_rate: String,
    total_cost: Decimal,
    progress: i32,
    dead_crab_count: i32,
}

impl AdvisorService {
    /// Create a new AdvisorService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            client: GeminiClient::from_config(&config.advisor),
            db,
        }
    }

    /// Start a chat session with the farm snapshot frozen into its system
    /// instruction
    pub async fn start_session(&self, user_id: Uuid) -> AppResult<ChatSessionResponse> {
        let cages = CageService::new(self.db.clone()).load_cages().await?;
        let harvested = HarvestService::new(self.db.clone()).get_harvested().await?;
        let system_instruction = build_chat_system_instruction(&cages, &harvested, Utc::now())?;

        let session_id = Uuid::new_v4();
        let mut tx = self.db.begin().await?;

        sqlx::query(
            "INSERT INTO advisor_sessions (id, user_id, system_instruction) VALUES ($1, $2, $3)",
        )
        .bind(session_id)
        .bind(user_id)
        .bind(&system_instruction)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO advisor_messages (session_id, role, content) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(ChatRole::Model.as_str())
            .bind(CHAT_GREETING)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ChatSessionResponse {
            session_id,
            greeting: CHAT_GREETING.to_string(),
        })
    }

    /// Send one chat message and return the whole reply
    ///
    /// The message and the reply are only persisted when generation
    /// succeeded, so a failed turn leaves the session as it was.
    pub async fn send_message(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        message: &str,
    ) -> AppResult<ChatReply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::ValidationError(
                "message must not be empty".to_string(),
            ));
        }

        let system_instruction = sqlx::query_scalar::<_, String>(
            "SELECT system_instruction FROM advisor_sessions WHERE id = $1 AND user_id = $2",
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Chat session {}", session_id)))?;

        let history = sqlx::query_as::<_, (String, String)>(
            "SELECT role, content FROM advisor_messages WHERE session_id = $1 ORDER BY id ASC",
        )
        .bind(session_id)
        .fetch_all(&self.db)
        .await?;

        let mut contents: Vec<Content> = history
            .iter()
            .map(|(role, content)| Content::text(role, content))
            .collect();
        contents.push(Content::text(ChatRole::User.as_str(), message));

        let Some(client) = &self.client else {
            tracing::warn!("Advisor is not configured, returning fallback chat reply");
            return Ok(ChatReply {
                reply: CHAT_FALLBACK.to_string(),
            });
        };

        let reply = match client.generate_with_system(&system_instruction, contents).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Chat generation failed: {}", e);
                return Ok(ChatReply {
                    reply: CHAT_FALLBACK.to_string(),
                });
            }
        };

        let mut tx = self.db.begin().await?;
        sqlx::query("INSERT INTO advisor_messages (session_id, role, content) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(ChatRole::User.as_str())
            .bind(message)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO advisor_messages (session_id, role, content) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(ChatRole::Model.as_str())
            .bind(&reply)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(ChatReply { reply })
    }

    /// Generate one of the fixed report types over the current farm state
    pub async fn generate_report(&self, report_type: ReportType) -> AppResult<Report> {
        let title = report_type.title().to_string();
        let cages = CageService::new(self.db.clone()).load_cages().await?;
        let harvested = HarvestService::new(self.db.clone()).get_harvested().await?;

        let prompt = build_report_prompt(report_type, &cages, &harvested, Utc::now())?;

        let Some(client) = &self.client else {
            tracing::warn!("Advisor is not configured, returning report failure content");
            return Ok(Report {
                title,
                content: REPORT_FAILURE_HTML.to_string(),
            });
        };

        let content = match client.generate(vec![Content::text("user", prompt)]).await {
            Ok(text) => strip_code_fences(&text),
            Err(e) => {
                tracing::warn!("Report generation failed: {}", e);
                REPORT_FAILURE_HTML.to_string()
            }
        };

        Ok(Report { title, content })
    }

    /// Run the structured health analysis for one cage
    ///
    /// Always produces a report: transport and parse failures come back as
    /// the canned connection-failure analysis.
    pub async fn health_check(&self, cage_id: &str) -> AppResult<AIHealthReport> {
        let cage = CageService::new(self.db.clone()).get_cage(cage_id).await?;
        let prompt = build_health_check_prompt(&cage);

        let Some(client) = &self.client else {
            tracing::warn!("Advisor is not configured, returning canned health report");
            return Ok(AIHealthReport::connection_failure());
        };

        let report = match client
            .generate_json(vec![Content::text("user", prompt)], health_report_schema())
            .await
        {
            Ok(text) => match serde_json::from_str::<AIHealthReport>(text.trim()) {
                Ok(report) => report,
                Err(e) => {
                    tracing::warn!("Health report parse failed: {}", e);
                    AIHealthReport::connection_failure()
                }
            },
            Err(e) => {
                tracing::warn!("Health check generation failed: {}", e);
                AIHealthReport::connection_failure()
            }
        };

        Ok(report)
    }
}

/// Freeze the farm state into the chat system instruction
fn build_chat_system_instruction(
    cages: &[Cage],
    harvested: &[HarvestedCage],
    now: DateTime<Utc>,
) -> AppResult<String> {
    let cage_summary: Vec<ChatCageSnapshot> = cages
        .iter()
        .map(|c| ChatCageSnapshot {
            id: c.id.clone(),
            current_weight: c.current_weight_g,
            progress: c.progress,
            farming_days: farming_days(c.start_date, now),
            total_cost: c.total_cost(),
        })
        .collect();

    let harvested_summary: Vec<ChatHarvestedSnapshot> = harvested
        .iter()
        .map(|h| ChatHarvestedSnapshot {
            id: h.id.clone(),
            final_weight: h.final_weight_g,
            profit: h.profit,
            revenue: h.revenue,
            total_cost: h.total_cost,
        })
        .collect();

    let active_json = to_snapshot_json(&cage_summary)?;
    let harvested_json = to_snapshot_json(&harvested_summary)?;

    Ok(format!(
        "You are the 'Thịnh Ý AI Advisor', a proactive and comprehensive management assistant \
         for a crab farm. Your responses must be in Vietnamese.\n    \
         Use the provided farm data to answer user questions. Be concise, insightful, and helpful.\n    \
         IMPORTANT: Format your responses using Markdown. Use tables for comparisons (e.g., top 3 \
         cages), bullet points for lists, and bold text for emphasis. When presenting any monetary \
         values (costs, revenue, profit), always format them using dots as thousand separators and \
         add the 'VND' suffix (e.g., 25.000 VND).\n    \
         Current farm data:\n    \
         - Active Cages: {}\n    \
         - Harvested Cages: {}",
        active_json, harvested_json
    ))
}

/// Build the prompt for one report type, embedding the computed farm figures
fn build_report_prompt(
    report_type: ReportType,
    cages: &[Cage],
    harvested: &[HarvestedCage],
    now: DateTime<Utc>,
) -> AppResult<String> {
    let cage_summary: Vec<ReportCageSnapshot> = cages
        .iter()
        .map(|c| {
            let days = farming_days(c.start_date, now);
            ReportCageSnapshot {
                id: c.id.clone(),
                current_weight: c.current_weight_g,
                farming_days: days,
                growth_rate: format!(
                    "{:.2}",
                    f64::from(c.current_weight_g - c.initial_weight_g) / days as f64
                ),
                total_cost: c.total_cost(),
                progress: c.progress,
                dead_crab_count: c.dead_crab_count,
            }
        })
        .collect();

    let harvested_summary: Vec<ChatHarvestedSnapshot> = harvested
        .iter()
        .map(|h| ChatHarvestedSnapshot {
            id: h.id.clone(),
            final_weight: h.final_weight_g,
            profit: h.profit,
            revenue: h.revenue,
            total_cost: h.total_cost,
        })
        .collect();

    let prompt = match report_type {
        ReportType::Overview => {
            let total_active = cages.len();
            let total_harvested = harvested.len();
            let average_weight = cages.iter().map(|c| f64::from(c.current_weight_g)).sum::<f64>()
                / total_active.max(1) as f64;
            let total_profit: Decimal = harvested.iter().map(|h| h.profit).sum();
            let total_active_cost: Decimal = cages.iter().map(|c| c.total_cost()).sum();
            let alert_count = cages.iter().filter(|c| c.ai_alert).count();
            let total_dead: i32 = cages.iter().map(|c| c.dead_crab_count).sum();

            format!(
                r#"Tạo một báo cáo tổng quan chi tiết bằng tiếng Việt về trang trại cua với dữ liệu sau.
Trình bày kết quả dưới dạng HTML. Bắt đầu bằng một đoạn văn tóm tắt ngắn (2-3 câu) về tình hình chung của trang trại.
Sau đó, tạo một bảng (sử dụng class của Tailwind CSS: "w-full text-sm text-left text-gray-500", thead với "text-xs text-gray-700 uppercase bg-gray-50", và tbody rows với "bg-white border-b") để hiển thị các chỉ số quan trọng.
Bảng nên có hai cột: "Chỉ số" và "Giá trị".

Dữ liệu để tạo báo cáo:
- Tổng số lồng đang nuôi: {}
- Tổng số lồng đã thu hoạch: {}
- Trọng lượng trung bình (đang nuôi): {:.2}g
- Tổng lợi nhuận (đã thu hoạch): {}
- Tổng chi phí (đang nuôi): {}
- Số lồng có cảnh báo AI: {}
- Tổng số cua chết đã ghi nhận: {}

Cuối cùng, dựa trên các số liệu trên, đặc biệt là số cua chết và cảnh báo AI, tạo một div với class "mt-4 p-3 bg-blue-50 rounded-lg" và đưa ra một "Đề xuất AI" ngắn gọn (1-2 câu) với tiêu đề h3 để cải thiện hoạt động. Ví dụ: "Tập trung kiểm tra các lồng có cảnh báo AI hoặc tỷ lệ chết cao để xử lý sớm." hoặc "Hiệu suất tốt, tiếp tục duy trì chế độ chăm sóc hiện tại.""#,
                total_active,
                total_harvested,
                average_weight,
                format_vnd(total_profit),
                format_vnd(total_active_cost),
                alert_count,
                total_dead
            )
        }
        ReportType::Performance => format!(
            r#"Phân tích hiệu suất tăng trưởng của các lồng cua. Dưới đây là dữ liệu tóm tắt của tất cả các lồng đang nuôi.
Dữ liệu: {}
Hãy xác định 3 lồng có tốc độ tăng trưởng (growthRate) cao nhất và 3 lồng thấp nhất.
Trình bày kết quả dưới dạng HTML với tiêu đề rõ ràng cho mỗi nhóm và một bảng đơn giản (sử dụng class của Tailwind CSS) cho mỗi nhóm, hiển thị ID lồng, trọng lượng hiện tại, tốc độ tăng trưởng (g/ngày) và số cua chết. Cuối cùng, đưa ra một nhận xét ngắn gọn về nguyên nhân có thể gây ra sự khác biệt, có tính đến cả số cua chết."#,
            to_snapshot_json(&cage_summary)?
        ),
        ReportType::HarvestReady => format!(
            r#"Dựa trên dữ liệu lồng cua, xác định các lồng đã sẵn sàng hoặc sắp sẵn sàng để thu hoạch. Mục tiêu thu hoạch là 500g.
Dữ liệu: {}
Hãy liệt kê các lồng có tiến độ (progress) từ 90% trở lên.
Trình bày kết quả dưới dạng HTML, sử dụng bảng (với class của Tailwind CSS) với các cột: ID Lồng, Trọng lượng hiện tại, Tiến độ (%), và một nhận xét ngắn về việc chuẩn bị thu hoạch. Nếu không có lồng nào, hãy thông báo."#,
            to_snapshot_json(&cage_summary)?
        ),
        ReportType::Profit => format!(
            r#"Phân tích lợi nhuận từ các lồng đã thu hoạch.
Dữ liệu: {}
Hãy tính tổng doanh thu, tổng chi phí và tổng lợi nhuận.
Trình bày kết quả dưới dạng HTML. Bắt đầu với các thẻ div hiển thị các con số tổng quan. Sau đó, hiển thị một bảng (sử dụng class của Tailwind CSS) chi tiết từng lồng đã thu hoạch với các cột: ID Lồng, Doanh thu, Chi phí, Lợi nhuận. Cuối cùng, đưa ra một phân tích ngắn gọn về tình hình lợi nhuận."#,
            to_snapshot_json(&harvested_summary)?
        ),
        ReportType::Inventory => {
            let feed_cost: Decimal = cages.iter().map(|c| c.costs.feed).sum();
            let medicine_cost: Decimal = cages.iter().map(|c| c.costs.medicine).sum();

            format!(
                r#"Tạo một báo cáo mô phỏng về quản lý kho vật tư (thức ăn, thuốc) bằng tiếng Việt.
Dựa trên tổng chi phí thức ăn và thuốc từ tất cả lồng đang nuôi và đã thu hoạch.
- Tổng chi phí thức ăn (đang nuôi): {}
- Tổng chi phí thuốc (đang nuôi): {}
Hãy ước tính lượng tiêu thụ và đề xuất kế hoạch nhập kho cho tháng tới. Giả định giá thức ăn là 50,000 VND/kg và thuốc là 200,000 VND/lọ.
Trình bày dưới dạng HTML với các đề mục rõ ràng."#,
                format_vnd(feed_cost),
                format_vnd(medicine_cost)
            )
        }
    };

    Ok(prompt)
}

/// Build the data block for the structured health analysis of one cage
fn build_health_check_prompt(cage: &Cage) -> String {
    let recent_weights = cage
        .growth_history
        .iter()
        .skip(cage.growth_history.len().saturating_sub(5))
        .map(|p| p.weight_g.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Phân tích sức khỏe của lồng cua dựa trên dữ liệu sau đây và trả về một đối tượng JSON.
Dữ liệu:
- ID Lồng: {}
- Ngày bắt đầu nuôi: {}
- Trọng lượng ban đầu: {}g
- Trọng lượng hiện tại: {}g
- Số cua chết: {}
- Tổng chi phí: {}
- Lịch sử tăng trưởng gần nhất: {}g
- Cảnh báo AI có sẵn: {}

Hãy tuân thủ nghiêm ngặt schema JSON sau."#,
        cage.id,
        cage.start_date.format("%-d/%-m/%Y"),
        cage.initial_weight_g,
        cage.current_weight_g,
        cage.dead_crab_count,
        format_vnd(cage.total_cost()),
        recent_weights,
        if cage.ai_alert { "Có" } else { "Không" }
    )
}

/// JSON schema the health-check response is constrained with
fn health_report_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "healthStatus": {
                "type": "STRING",
                "enum": ["KHỎE MẠNH", "CẦN CHÚ Ý", "NGUY CƠ CAO"],
                "description": "Tình trạng sức khỏe tổng quát."
            },
            "statusColor": {
                "type": "STRING",
                "enum": ["green", "yellow", "red"],
                "description": "Màu tương ứng với trạng thái."
            },
            "summary": {
                "type": "STRING",
                "description": "Một câu tóm tắt ngắn gọn tình hình."
            },
            "keyObservations": {
                "type": "ARRAY",
                "description": "Liệt kê các quan sát chính, cả tốt và xấu.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "text": {
                            "type": "STRING",
                            "description": "Nội dung quan sát."
                        },
                        "isPositive": {
                            "type": "BOOLEAN",
                            "description": "Quan sát này là tích cực hay tiêu cực."
                        }
                    }
                }
            },
            "recommendation": {
                "type": "STRING",
                "description": "Một đề xuất hành động cụ thể."
            }
        },
        "required": ["healthStatus", "statusColor", "summary", "keyObservations", "recommendation"]
    })
}

fn to_snapshot_json<T: Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string(value)
        .map_err(|e| AppError::Internal(format!("Snapshot serialization error: {}", e)))
}

/// Strip markdown code fences the model sometimes wraps HTML in
fn strip_code_fences(content: &str) -> String {
    content.replace("```html", "").replace("```", "")
}
