//! Response bodies for the setup endpoint.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use shukku_core::DemoCatalog;
use shukku_core::fixture::{COUPLE_NAME, INVITE_CODE};

use super::verify::CollectionCounts;

/// Headline of a successful run.
pub const SUCCESS_MESSAGE: &str = "Shukku List Database Setup Complete!";

/// Body of the `405` returned for anything but `GET`/`OPTIONS`.
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Use GET request to setup database";

/// Checklist attached to every failed run.
pub const SETUP_HELP: &str = "
Required Setup:
1. Firebase Project: shukku-list
2. Enable Authentication → Email/Password
3. Create Firestore Database
4. Add FIREBASE_SERVICE_ACCOUNT to the deployment environment
";

const NEXT_STEPS: [&str; 3] = [
    "Your main app can now connect to Firebase",
    "Test with the demo UIDs in your app",
    "Real users will be created through signup",
];

/// What a successful run provisioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupReport {
    /// Project the data was written to
    pub project: String,
    /// Documents in `users` after the seed (all of them, not just the demo)
    pub users: u64,
    /// Documents in `pairs` after the seed
    pub pairs: u64,
    pub demo: DemoSummary,
    pub next_steps: Vec<String>,
}

/// Credentials a tester needs to use the demo data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoSummary {
    pub couple: String,
    pub invite_code: String,
    pub users: Vec<DemoUser>,
    /// Items on the demo list
    pub items: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoUser {
    pub name: String,
    pub email: String,
    pub uid: String,
}

impl SetupReport {
    /// Summarize a run against `project`.
    #[must_use]
    pub fn new(project: &str, catalog: &DemoCatalog, counts: CollectionCounts) -> Self {
        let users = catalog
            .users()
            .iter()
            .map(|user| DemoUser {
                name: user.name.clone(),
                email: user.email.to_string(),
                uid: user.uid.to_string(),
            })
            .collect();

        Self {
            project: project.to_string(),
            users: counts.users,
            pairs: counts.pairs,
            demo: DemoSummary {
                couple: COUPLE_NAME.to_string(),
                invite_code: INVITE_CODE.to_string(),
                users,
                items: catalog.item_count(),
            },
            next_steps: NEXT_STEPS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Error half of [`SetupResponse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupFailure {
    pub error: String,
    /// Remediation text, omitted from the body when `None`
    pub help: Option<String>,
}

impl SetupFailure {
    /// A failed run: the message plus the setup checklist.
    #[must_use]
    pub fn with_help(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            help: Some(SETUP_HELP.to_string()),
        }
    }

    /// A request with the wrong HTTP method.
    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self {
            error: METHOD_NOT_ALLOWED_MESSAGE.to_string(),
            help: None,
        }
    }
}

/// Body of every setup response, discriminated by a `success` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupResponse {
    Success {
        data: SetupReport,
        /// When the report was produced
        timestamp: DateTime<Utc>,
    },
    Failure(SetupFailure),
}

impl SetupResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl Serialize for SetupResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success { data, timestamp } => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("message", SUCCESS_MESSAGE)?;
                map.serialize_entry("data", data)?;
                map.serialize_entry(
                    "timestamp",
                    &timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                )?;
                map.end()
            }
            Self::Failure(failure) => {
                let len = if failure.help.is_some() { 3 } else { 2 };
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", &failure.error)?;
                if let Some(help) = &failure.help {
                    map.serialize_entry("help", help)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_success_body_shape() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let catalog = DemoCatalog::build(now).unwrap();
        let report = SetupReport::new(
            "shukku-list",
            &catalog,
            CollectionCounts { users: 2, pairs: 1 },
        );

        let body = serde_json::to_value(SetupResponse::Success {
            data: report,
            timestamp: now,
        })
        .unwrap();

        assert_eq!(body["success"], json!(true));
        assert_eq!(body["message"], json!(SUCCESS_MESSAGE));
        assert_eq!(body["timestamp"], json!("2026-10-19T12:00:00.000Z"));
        assert_eq!(body["data"]["project"], json!("shukku-list"));
        assert_eq!(body["data"]["users"], json!(2));
        assert_eq!(body["data"]["demo"]["inviteCode"], json!("729463"));
        assert_eq!(body["data"]["demo"]["couple"], json!("Giash & Rina"));
        assert_eq!(body["data"]["demo"]["items"], json!(6));
        assert_eq!(
            body["data"]["demo"]["users"][1],
            json!({ "name": "Rina", "email": "rina@shukku.com", "uid": "rina_uid" })
        );
        assert_eq!(body["data"]["nextSteps"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_failure_bodies() {
        let body = serde_json::to_value(SetupResponse::Failure(SetupFailure::with_help(
            "boom",
        )))
        .unwrap();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!("boom"));
        assert!(body["help"].as_str().unwrap().contains("Required Setup:"));

        let body =
            serde_json::to_value(SetupResponse::Failure(SetupFailure::method_not_allowed()))
                .unwrap();
        assert_eq!(
            body,
            json!({ "success": false, "error": "Use GET request to setup database" })
        );
    }
}
