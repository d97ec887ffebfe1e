use admitdesk_config::{AdmitCardConfig, EmailConfig};
use admitdesk_core::errors::AppError;
use admitdesk_models::settings::ExamDetails;
use admitdesk_models::students::Student;
use async_trait::async_trait;
use lettre::message::{Attachment, MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::instrument;

/// A fully composed message, independent of the transport.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    pub attachments: Vec<EmailAttachment>,
}

#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Delivers one message. The error message is shown to the admin as the
    /// skip reason, so it should say what the provider reported.
    async fn send(&self, email: OutgoingEmail) -> Result<(), AppError>;
}

pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> Result<SmtpTransport, AppError> {
        if self.config.smtp_username.is_empty() {
            return Ok(SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build());
        }

        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        Ok(SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| AppError::internal_error(format!("Failed to create SMTP relay: {}", e)))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build())
    }

    fn build_message(&self, email: OutgoingEmail) -> Result<Message, AppError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let body = MultiPart::alternative()
            .singlepart(
                SinglePart::builder()
                    .header(header::ContentType::TEXT_PLAIN)
                    .body(email.text_body),
            )
            .singlepart(
                SinglePart::builder()
                    .header(header::ContentType::TEXT_HTML)
                    .body(email.html_body),
            );

        let mut mixed = MultiPart::mixed().multipart(body);
        for attachment in email.attachments {
            let content_type = header::ContentType::parse(&attachment.content_type)
                .map_err(|e| AppError::internal_error(format!("Invalid content type: {}", e)))?;
            mixed = mixed
                .singlepart(Attachment::new(attachment.filename).body(attachment.content, content_type));
        }

        Message::builder()
            .from(
                from.parse()
                    .map_err(|e| AppError::internal_error(format!("Invalid from email: {}", e)))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|e| AppError::internal_error(format!("Invalid to email: {}", e)))?)
            .subject(email.subject)
            .multipart(mixed)
            .map_err(|e| AppError::internal_error(format!("Failed to build email: {}", e)))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip(self, email), fields(to = %email.to))]
    async fn send(&self, email: OutgoingEmail) -> Result<(), AppError> {
        let message = self.build_message(email)?;
        let mailer = self.transport()?;

        tokio::task::spawn_blocking(move || mailer.send(&message))
            .await
            .map_err(|e| AppError::internal_error(format!("Task join error: {}", e)))?
            .map_err(|e| AppError::internal_error(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

/// Used when SMTP is disabled. Messages are logged and reported as sent.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), AppError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            attachments = email.attachments.len(),
            "SMTP disabled, email not delivered"
        );
        Ok(())
    }
}

/// Composes the admit card email with the PDF attached as `<studentId>.pdf`.
pub fn admit_card_email(
    branding: &AdmitCardConfig,
    student: &Student,
    to: &str,
    details: &ExamDetails,
    year: i32,
    pdf: Vec<u8>,
) -> OutgoingEmail {
    let subject = format!("Admit Card for {} {}", branding.exam_title, year);

    let text_body = format!(
        "Dear {},\n\n\
         1. Please download and print your Admit Card attached below for the exam.\n\
         2. Exam Date: {}\n\
         3. Venue: {}\n\
         4. Reporting Time: {}\n\n\
         5. In case of any difficulty, please contact @ {}\n\n\
         With Best Wishes,\n{}",
        student.student_name,
        details.exam_date,
        details.venue,
        details.reporting_time,
        branding.helpline,
        branding.signature_lines.join("\n"),
    );

    OutgoingEmail {
        to: to.to_string(),
        subject,
        text_body,
        html_body: admit_card_template(branding, &student.student_name, details),
        attachments: vec![EmailAttachment {
            filename: format!("{}.pdf", student.student_id),
            content_type: "application/pdf".to_string(),
            content: pdf,
        }],
    }
}

fn admit_card_template(branding: &AdmitCardConfig, name: &str, details: &ExamDetails) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Admit Card</title>
</head>
<body style="margin: 0; padding: 20px; font-family: Arial, sans-serif; color: #333333;">
    <p>Dear <b>{}</b>,</p>
    <p>1. Please download and print your Admit Card attached below for the exam.</p>
    <p>2. <b>Exam Date:</b> {}</p>
    <p>3. <b>Venue:</b> {}</p>
    <p>4. <b>Reporting Time:</b> {}</p>
    <br/>
    <p>5. In case of any difficulty, please contact @ {}</p>
    <br/>
    <p>With Best Wishes,<br/>{}</p>
</body>
</html>"#,
        escape_html(name),
        escape_html(&details.exam_date),
        escape_html(&details.venue),
        escape_html(&details.reporting_time),
        escape_html(&branding.helpline),
        branding
            .signature_lines
            .iter()
            .map(|line| escape_html(line))
            .collect::<Vec<_>>()
            .join("<br/>"),
    )
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use admitdesk_models::StudentId;
    use admitdesk_models::students::{ClassMoving, Gender, NewStudent, Stream, Target};
    use chrono::Utc;

    fn student() -> Student {
        NewStudent {
            student_name: "Ravi <Kumar>".to_string(),
            gender: Gender::Male,
            class_moving: ClassMoving::TenthToEleventh,
            date_of_birth: None,
            stream: Stream::Pcm,
            target: Target::Jee,
            father_name: "Suresh".to_string(),
            mother_name: "Sita".to_string(),
            email: Some("ravi@example.com".to_string()),
            permanent_address: "Gaya".to_string(),
            present_address: "Gaya".to_string(),
            parent_mobile: "9876543210".to_string(),
            student_mobile: None,
            whatsapp_mobile: None,
            previous_school: "DAV".to_string(),
            previous_result_percentage: 91.0,
            test_centre: "Centre".to_string(),
            scholarship_offered: false,
            scholarship_details: None,
            passport_photo_url: "p".to_string(),
            identity_photo_url: "i".to_string(),
        }
        .into_student(StudentId::from_sequence(7), Utc::now())
    }

    fn details() -> ExamDetails {
        ExamDetails {
            exam_date: "09/03/2025".to_string(),
            venue: "British School Gurukul".to_string(),
            exam_time: "09:00 AM - 11:00 AM".to_string(),
            reporting_time: "08:00 AM".to_string(),
        }
    }

    #[test]
    fn test_admit_card_email_contents() {
        let branding = AdmitCardConfig::default();
        let email = admit_card_email(
            &branding,
            &student(),
            "ravi@example.com",
            &details(),
            2025,
            vec![1, 2, 3],
        );

        assert_eq!(
            email.subject,
            "Admit Card for Super 30 South Bihar Talent Search Examination 2025"
        );
        assert_eq!(email.attachments.len(), 1);
        assert_eq!(email.attachments[0].filename, "STU0007.pdf");
        assert!(email.html_body.contains("<b>Exam Date:</b> 09/03/2025"));
        assert!(email.html_body.contains("Reporting Time:</b> 08:00 AM"));
        assert!(email.html_body.contains("PIN - 823003"));
        assert!(email.html_body.contains("Ravi &lt;Kumar&gt;"));
        assert!(email.text_body.contains("7766994020"));
    }

    #[tokio::test]
    async fn test_log_mailer_accepts_everything() {
        let email = admit_card_email(
            &AdmitCardConfig::default(),
            &student(),
            "ravi@example.com",
            &details(),
            2025,
            Vec::new(),
        );
        assert!(LogMailer.send(email).await.is_ok());
    }
}
