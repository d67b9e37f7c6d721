//! CSV rendering for the admin export endpoints.

use crate::entities::{login_logs, registrations};

/// Free-text fields are always double-quoted, with embedded quotes doubled.
fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[must_use]
pub fn registrations_csv(rows: &[registrations::Model]) -> String {
    let mut out = String::from("Name,Email,Phone,Gender,Ticket Type,Status,Registered At\n");

    for row in rows {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            quoted(&row.name),
            row.email,
            quoted(&row.phone),
            row.gender,
            row.ticket_type,
            row.status,
            row.created_at,
        ));
    }

    out
}

#[must_use]
pub fn login_logs_csv(rows: &[login_logs::Model]) -> String {
    let mut out = String::from("Email,Login Time,Browser,OS,Device,IP\n");

    for row in rows {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            row.email,
            row.login_time,
            row.browser,
            row.os,
            row.device,
            row.ip.as_deref().unwrap_or("N/A"),
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(name: &str, phone: &str) -> registrations::Model {
        registrations::Model {
            id: 1,
            name: name.to_string(),
            email: "jane@example.com".to_string(),
            phone: phone.to_string(),
            gender: "female".to_string(),
            ticket_type: "vip".to_string(),
            status: "active".to_string(),
            registration_source: "web".to_string(),
            created_at: "2026-08-01T10:00:00+00:00".to_string(),
            updated_at: "2026-08-01T10:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn free_text_fields_are_always_quoted() {
        let csv = registrations_csv(&[registration("Test Person", "+1 555 000 1111")]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "\"Test Person\",jane@example.com,\"+1 555 000 1111\",female,vip,active,2026-08-01T10:00:00+00:00"
        );
    }

    #[test]
    fn embedded_quotes_and_commas_survive_quoting() {
        let csv = registrations_csv(&[registration("Doe, \"JD\" Jane", "+1 555 000 1111")]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("\"Doe, \"\"JD\"\" Jane\","));
    }

    #[test]
    fn registration_header_matches_export_contract() {
        let csv = registrations_csv(&[]);
        assert_eq!(
            csv.trim_end(),
            "Name,Email,Phone,Gender,Ticket Type,Status,Registered At"
        );
    }

    #[test]
    fn missing_ip_falls_back_to_na() {
        let rows = vec![login_logs::Model {
            id: 1,
            email: "jane@example.com".to_string(),
            login_time: "2026-08-01T10:00:00+00:00".to_string(),
            user_agent: None,
            browser: "Chrome".to_string(),
            os: "Windows".to_string(),
            device: "Desktop".to_string(),
            ip: None,
        }];

        let csv = login_logs_csv(&rows);
        assert!(csv.lines().nth(1).unwrap().ends_with(",N/A"));
    }
}
