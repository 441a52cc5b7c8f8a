// ============================================================================
// REPORT NOTIFIER - Envío del reporte de días con mayor venta
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::{
    message::header::ContentType,
    transport::smtp::{authentication::Credentials, response::Response},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::fmt::Write as _;
use tracing::info;

use crate::config::SmtpConfig;
use crate::error::NotificationError;
use crate::models::DailyAggregate;

/// Delivery of a finished top-selling-days report. Formatting and transport
/// belong to the implementation.
#[async_trait]
pub trait ReportNotifier: Send + Sync {
    async fn send_top_selling_days(&self, recipient: &str, days: &[DailyAggregate]) -> Result<(), NotificationError>;
}

pub struct SmtpReportNotifier {
    smtp_server: String,
    smtp_username: String,
    smtp_password: String,
    from: String,
}

impl SmtpReportNotifier {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, NotificationError> {
        let smtp_username = config
            .username
            .clone()
            .ok_or_else(|| NotificationError::configuration("SMTP_USERNAME not configured"))?;
        let smtp_password = config
            .password
            .clone()
            .ok_or_else(|| NotificationError::configuration("SMTP_PASSWORD not configured"))?;
        let from = config.from.clone().unwrap_or_else(|| smtp_username.clone());

        Ok(Self {
            smtp_server: config.server.clone(),
            smtp_username,
            smtp_password,
            from,
        })
    }
}

#[async_trait]
impl ReportNotifier for SmtpReportNotifier {
    async fn send_top_selling_days(&self, recipient: &str, days: &[DailyAggregate]) -> Result<(), NotificationError> {
        let generated_at = Utc::now();

        let email_message = Message::builder()
            .from(self.from.parse()?)
            .to(recipient.parse()?)
            .subject(report_subject(generated_at))
            .header(ContentType::TEXT_PLAIN)
            .body(render_plain(days, generated_at))?;

        let creds = Credentials::new(self.smtp_username.clone(), self.smtp_password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.smtp_server)?
            .credentials(creds)
            .build();

        let response = mailer.send(email_message).await?;
        accepted(&response)?;

        info!("✅ Top selling days report sent to: {}", recipient);
        Ok(())
    }
}

fn accepted(response: &Response) -> Result<(), NotificationError> {
    if response.is_positive() {
        Ok(())
    } else {
        Err(NotificationError::delivery(format!(
            "SMTP relay answered {}",
            response.code()
        )))
    }
}

pub fn report_subject(generated_at: DateTime<Utc>) -> String {
    format!(
        "Reporte de Días con Mayor Venta - {}",
        generated_at.format("%d/%m/%Y")
    )
}

/// Plain-text body, one line per ranked day.
pub fn render_plain(days: &[DailyAggregate], generated_at: DateTime<Utc>) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "Días con mayor venta");
    let _ = writeln!(body, "Generado: {}", generated_at.format("%d/%m/%Y %H:%M UTC"));
    let _ = writeln!(body);

    if days.is_empty() {
        let _ = writeln!(body, "No hay facturas registradas.");
        return body;
    }

    for (index, day) in days.iter().enumerate() {
        let _ = writeln!(
            body,
            "{}. {} - {} - promedio {:.2}",
            index + 1,
            day.day.format("%d/%m/%Y"),
            day.total_sales_label(),
            day.average_invoice_value
        );
    }
    body
}
