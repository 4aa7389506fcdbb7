//! Messaging composer
//!
//! Byte-length accounting, message-kind selection, `#{var}` template
//! rendering and the send loop that batches recipients sharing a body.

use std::collections::HashMap;
use std::sync::OnceLock;
use regex::{Captures, Regex};
use tracing::{info, warn};
use crate::config::MessagingConfig;
use crate::database::DatabaseService;
use crate::models::message::{
    MessageKind, MessageTemplate, MessageLog, CreateTemplateRequest, CreateMessageLogRequest, DeliveryStatus,
    Recipient, SendMessageRequest, PreviewRequest, MessagePreview, SendReport,
};
use crate::services::gateway::{GatewayClient, GatewayRequest};
use crate::utils::errors::{TourDeskError, Result};
use crate::utils::helpers::normalize_phone;
use crate::utils::logging::log_gateway_call;

/// Largest body billed as a short message
pub const SMS_BYTE_LIMIT: usize = 90;
/// Largest LMS/MMS body the gateway accepts
pub const LONG_MESSAGE_BYTE_LIMIT: usize = 2000;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#\{([^{}]+)\}").expect("valid placeholder regex"))
}

/// Billing length: two bytes per non-ASCII character, one otherwise
pub fn byte_length(text: &str) -> usize {
    text.chars().map(|c| if (c as u32) > 127 { 2 } else { 1 }).sum()
}

/// Pick the message kind for a rendered body
pub fn classify_kind(body: &str, has_image: bool, forced: Option<MessageKind>) -> Result<MessageKind> {
    if forced == Some(MessageKind::Kakao) {
        return Ok(MessageKind::Kakao);
    }

    let bytes = byte_length(body);
    let kind = if has_image {
        MessageKind::Mms
    } else if bytes <= SMS_BYTE_LIMIT {
        MessageKind::Sms
    } else {
        MessageKind::Lms
    };

    if bytes > LONG_MESSAGE_BYTE_LIMIT {
        return Err(TourDeskError::MessageTooLong { bytes, limit: LONG_MESSAGE_BYTE_LIMIT });
    }
    Ok(kind)
}

/// Distinct placeholder names in order of first appearance
pub fn variables(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in placeholder_regex().captures_iter(template) {
        let name = caps[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Replace `#{name}` for every provided key; unknown placeholders stay
///
/// Substitution is a single pass over the template, so placeholders inside
/// substituted values are left as written.
pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures| {
            vars.get(&caps[1]).cloned().unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

pub fn unit_cost(config: &MessagingConfig, kind: MessageKind) -> i64 {
    match kind {
        MessageKind::Sms => config.sms_cost,
        MessageKind::Lms => config.lms_cost,
        MessageKind::Mms => config.mms_cost,
        MessageKind::Kakao => config.kakao_cost,
    }
}

pub fn estimate_cost(config: &MessagingConfig, kind: MessageKind, recipients: usize) -> i64 {
    unit_cost(config, kind) * recipients as i64
}

/// Recipients sharing an identical rendered body, in first-seen order
pub fn group_by_body(rendered: Vec<(Recipient, String)>) -> Vec<(String, Vec<Recipient>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<Recipient>)> = Vec::new();

    for (recipient, body) in rendered {
        match index.get(&body) {
            Some(&i) => groups[i].1.push(recipient),
            None => {
                index.insert(body.clone(), groups.len());
                groups.push((body, vec![recipient]));
            }
        }
    }
    groups
}

/// Messaging service
#[derive(Debug, Clone)]
pub struct MessagingService {
    db: DatabaseService,
    gateway: GatewayClient,
    config: MessagingConfig,
}

impl MessagingService {
    pub fn new(db: DatabaseService, gateway: GatewayClient, config: MessagingConfig) -> Self {
        Self { db, gateway, config }
    }

    /// Render a body and report its length, kind and cost
    pub fn preview(&self, request: &PreviewRequest) -> Result<MessagePreview> {
        let body = render(&request.content, &request.variables);
        let kind = classify_kind(&body, request.image_url.is_some(), request.kind)?;

        Ok(MessagePreview {
            bytes: byte_length(&body),
            unresolved: variables(&body),
            estimated_cost: estimate_cost(&self.config, kind, request.recipient_count),
            kind,
            body,
        })
    }

    pub async fn create_template(&self, request: CreateTemplateRequest) -> Result<MessageTemplate> {
        if request.name.trim().is_empty() || request.content.trim().is_empty() {
            return Err(TourDeskError::InvalidInput("Template name and content are required".to_string()));
        }
        self.db.messages.create_template(request).await
    }

    pub async fn templates(&self) -> Result<Vec<MessageTemplate>> {
        self.db.messages.list_templates().await
    }

    pub async fn logs(&self, tour_id: Option<i64>, limit: i64) -> Result<Vec<MessageLog>> {
        self.db.messages.list_logs(tour_id, limit.clamp(1, 1000)).await
    }

    /// Render per recipient, send one gateway call per distinct body and log every recipient
    pub async fn send(&self, mut request: SendMessageRequest) -> Result<SendReport> {
        if request.recipients.is_empty() {
            return Err(TourDeskError::InvalidInput("No recipients".to_string()));
        }

        if let Some(template_id) = request.template_id {
            let template = self.db.messages.find_template(template_id).await?
                .ok_or(TourDeskError::TemplateNotFound { template_id })?;
            request.content = request.content.or(Some(template.content));
            request.title = request.title.or(template.title);
            request.image_url = request.image_url.or(template.image_url);
            if request.kind.is_none() {
                request.kind = template.kind.parse::<MessageKind>().ok().filter(|k| *k == MessageKind::Kakao);
            }
        }

        let content = request.content.clone()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| TourDeskError::InvalidInput("Message content is required".to_string()))?;

        let mut shared = HashMap::new();
        if let Some(tour_id) = request.tour_id {
            let tour = self.db.tours.find_by_id(tour_id).await?
                .ok_or(TourDeskError::TourNotFound { tour_id })?;
            shared.insert("투어명".to_string(), tour.title.clone());
            shared.insert("tour".to_string(), tour.title);
        }
        shared.extend(request.variables.clone());

        let mut report = SendReport::default();
        let mut rendered = Vec::with_capacity(request.recipients.len());

        for mut recipient in request.recipients.clone() {
            match normalize_phone(&recipient.phone) {
                Some(phone) => recipient.phone = phone,
                None => {
                    let error = format!("Invalid phone number: {}", recipient.phone);
                    self.log_delivery(&request, &recipient, MessageKind::Sms, &content, DeliveryStatus::Failed, 0, Some(error.clone())).await?;
                    report.failed += 1;
                    report.errors.push(error);
                    continue;
                }
            }

            let mut vars = shared.clone();
            if let Some(name) = &recipient.name {
                vars.insert("이름".to_string(), name.clone());
                vars.insert("name".to_string(), name.clone());
            }
            vars.extend(recipient.variables.clone());

            let body = render(&content, &vars);
            rendered.push((recipient, body));
        }

        for (body, recipients) in group_by_body(rendered) {
            self.send_group(&request, body, recipients, &mut report).await?;
        }

        info!(
            sent = report.sent,
            failed = report.failed,
            total_cost = report.total_cost,
            "Message send finished"
        );
        Ok(report)
    }

    async fn send_group(
        &self,
        request: &SendMessageRequest,
        body: String,
        recipients: Vec<Recipient>,
        report: &mut SendReport,
    ) -> Result<()> {
        let kind = match classify_kind(&body, request.image_url.is_some(), request.kind) {
            Ok(kind) => kind,
            Err(e) => {
                let error = e.to_string();
                for recipient in &recipients {
                    self.log_delivery(request, recipient, MessageKind::Lms, &body, DeliveryStatus::Failed, 0, Some(error.clone())).await?;
                }
                report.failed += recipients.len() as u32;
                report.errors.push(error);
                return Ok(());
            }
        };

        let gateway_request = GatewayRequest {
            kind,
            sender: self.gateway.sender_number().to_string(),
            recipients: recipients.iter().map(|r| r.phone.clone()).collect(),
            title: request.title.clone().filter(|_| kind != MessageKind::Sms),
            content: body.clone(),
            template_id: request.template_id,
            image_url: request.image_url.clone().filter(|_| kind == MessageKind::Mms),
        };

        let (sent, gateway_error) = match self.gateway.send(&gateway_request).await {
            Ok(response) => {
                let error = (response.failed > 0).then(|| format!("Gateway rejected {} of {} recipients", response.failed, recipients.len()));
                (response.sent as usize, error)
            }
            Err(e) => {
                warn!(kind = %kind, recipients = recipients.len(), recoverable = e.is_recoverable(), error = %e, "Gateway call failed");
                (0, Some(e.to_string()))
            }
        };
        log_gateway_call(kind.as_str(), recipients.len(), sent as u32, (recipients.len() - sent) as u32);

        // The gateway reports counts only; the first `sent` recipients are recorded as delivered.
        let cost = unit_cost(&self.config, kind);
        for (i, recipient) in recipients.iter().enumerate() {
            if i < sent {
                self.log_delivery(request, recipient, kind, &body, DeliveryStatus::Sent, cost, None).await?;
                report.sent += 1;
                report.total_cost += cost;
            } else {
                self.log_delivery(request, recipient, kind, &body, DeliveryStatus::Failed, 0, gateway_error.clone()).await?;
                report.failed += 1;
            }
        }
        if let Some(error) = gateway_error {
            report.errors.push(error);
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn log_delivery(
        &self,
        request: &SendMessageRequest,
        recipient: &Recipient,
        kind: MessageKind,
        body: &str,
        status: DeliveryStatus,
        cost: i64,
        error: Option<String>,
    ) -> Result<()> {
        self.db.messages.insert_log(CreateMessageLogRequest {
            tour_id: request.tour_id,
            template_id: request.template_id,
            recipient_phone: recipient.phone.clone(),
            recipient_name: recipient.name.clone(),
            kind,
            title: request.title.clone(),
            body: body.to_string(),
            status,
            cost,
            error,
        }).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn costs() -> MessagingConfig {
        MessagingConfig {
            sms_cost: 20,
            lms_cost: 50,
            mms_cost: 200,
            kakao_cost: 15,
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn recipient(phone: &str) -> Recipient {
        Recipient {
            phone: phone.to_string(),
            name: None,
            variables: HashMap::new(),
        }
    }

    #[test]
    fn test_byte_length() {
        assert_eq!(byte_length(""), 0);
        assert_eq!(byte_length("hello"), 5);
        assert_eq!(byte_length("안녕"), 4);
        assert_eq!(byte_length("A안"), 3);
    }

    #[test]
    fn test_classify_kind() {
        assert_eq!(classify_kind("짧은 안내", false, None).unwrap(), MessageKind::Sms);
        assert_eq!(classify_kind(&"a".repeat(90), false, None).unwrap(), MessageKind::Sms);
        assert_eq!(classify_kind(&"a".repeat(91), false, None).unwrap(), MessageKind::Lms);
        assert_eq!(classify_kind("사진", true, None).unwrap(), MessageKind::Mms);
        assert_eq!(classify_kind(&"가".repeat(2000), false, Some(MessageKind::Kakao)).unwrap(), MessageKind::Kakao);
        assert_eq!(classify_kind("hi", false, Some(MessageKind::Lms)).unwrap(), MessageKind::Sms);
    }

    #[test]
    fn test_long_messages_rejected() {
        assert_eq!(classify_kind(&"a".repeat(2000), false, None).unwrap(), MessageKind::Lms);
        assert_matches!(
            classify_kind(&"가".repeat(1001), false, None),
            Err(TourDeskError::MessageTooLong { bytes: 2002, limit: 2000 })
        );
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let body = render("#{이름}님, #{투어명} 출발은 #{날짜}입니다. #{이름}님 감사합니다", &vars(&[("이름", "홍길동"), ("투어명", "제주")]));
        assert_eq!(body, "홍길동님, 제주 출발은 #{날짜}입니다. 홍길동님 감사합니다");
        assert_eq!(variables(&body), vec!["날짜".to_string()]);
    }

    #[test]
    fn test_render_does_not_expand_substituted_values() {
        // Fresh maps get fresh hash seeds, so iteration order varies
        for _ in 0..20 {
            let values = vars(&[("메모", "#{이름} 확인"), ("이름", "홍길동")]);
            assert_eq!(render("#{메모}", &values), "#{이름} 확인");
            assert_eq!(render("#{이름}: #{메모}", &values), "홍길동: #{이름} 확인");
        }
    }

    #[test]
    fn test_variables_are_distinct_and_ordered() {
        assert_eq!(
            variables("#{b} #{a} #{b} #{c}"),
            vec!["b".to_string(), "a".to_string(), "c".to_string()]
        );
        assert!(variables("no placeholders #{}").is_empty());
    }

    #[test]
    fn test_cost() {
        assert_eq!(estimate_cost(&costs(), MessageKind::Sms, 10), 200);
        assert_eq!(estimate_cost(&costs(), MessageKind::Mms, 3), 600);
        assert_eq!(estimate_cost(&costs(), MessageKind::Kakao, 0), 0);
    }

    #[test]
    fn test_group_by_body_keeps_first_seen_order() {
        let groups = group_by_body(vec![
            (recipient("010-0000-0001"), "B".to_string()),
            (recipient("010-0000-0002"), "A".to_string()),
            (recipient("010-0000-0003"), "B".to_string()),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "B");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].1[0].phone, "010-0000-0002");
    }

    proptest! {
        #[test]
        fn prop_ascii_length_is_char_count(s in "[ -~]{0,200}") {
            prop_assert_eq!(byte_length(&s), s.chars().count());
        }

        #[test]
        fn prop_hangul_length_is_double(s in "[가-힣]{0,200}") {
            prop_assert_eq!(byte_length(&s), 2 * s.chars().count());
        }

        #[test]
        fn prop_render_without_vars_is_identity(s in ".{0,100}") {
            prop_assert_eq!(render(&s, &HashMap::new()), s);
        }
    }
}
