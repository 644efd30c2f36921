//! Synthetic contact trace records.

use chrono::{DateTime, Duration, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Serialize, Serializer};
use uuid::Builder;

static FIRST_NAMES: [&str; 10] = [
    "James", "Mary", "John", "Patricia", "Robert", "Jennifer", "Michael", "Linda", "William",
    "Elizabeth",
];
static LAST_NAMES: [&str; 10] = [
    "Smith", "Johnson", "Williams", "Jones", "Brown", "Davis", "Miller", "Wilson", "Moore",
    "Taylor",
];
static AGENT_NAMES: [&str; 6] = [
    "Alex Johnson",
    "Jamie Smith",
    "Casey Brown",
    "Morgan Lee",
    "Taylor Wilson",
    "Sam Davis",
];
static QUEUES: [&str; 5] = [
    "GeneralQueue",
    "SalesQueue",
    "SupportQueue",
    "BillingQueue",
    "TechnicalQueue",
];
static PHONE_TYPES: [&str; 3] = ["LANDLINE", "MOBILE", "VOIP"];
static DISCONNECT_REASONS: [&str; 4] = [
    "CUSTOMER_DISCONNECT",
    "AGENT_DISCONNECT",
    "THIRD_PARTY_DISCONNECT",
    "TELECOM_PROBLEM",
];
static SENTIMENTS: [&str; 3] = ["Positive", "Neutral", "Negative"];
static RESOLUTIONS: [&str; 4] = ["Resolved", "Escalated", "Follow-up", "Unresolved"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    Voice,
    Chat,
    Task,
}

static CHANNELS: [Channel; 3] = [Channel::Voice, Channel::Chat, Channel::Task];

fn ctr_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContactTraceRecord {
    #[serde(rename = "AWSAccountId")]
    pub aws_account_id: String,
    pub instance_id: String,
    pub contact_id: String,
    pub channel: Channel,
    #[serde(serialize_with = "ctr_timestamp")]
    pub initiation_timestamp: DateTime<Utc>,
    #[serde(serialize_with = "ctr_timestamp")]
    pub connected_to_system_timestamp: DateTime<Utc>,
    #[serde(serialize_with = "ctr_timestamp")]
    pub disconnect_timestamp: DateTime<Utc>,
    pub customer_endpoint: Endpoint,
    pub initial_contact_id: String,
    pub initiation_method: String,
    pub disconnect_reason: String,
    pub queue: QueueInfo,
    pub agent_info: AgentInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording: Option<Recording>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_voice_activity: Option<VoiceActivity>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Endpoint {
    #[serde(rename = "Type")]
    pub kind: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueueInfo {
    pub queue_name: String,
    pub queue_id: String,
    #[serde(serialize_with = "ctr_timestamp")]
    pub enqueue_timestamp: DateTime<Utc>,
    #[serde(serialize_with = "ctr_timestamp")]
    pub dequeue_timestamp: DateTime<Utc>,
    pub duration: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentInfo {
    pub agent_id: String,
    #[serde(serialize_with = "ctr_timestamp")]
    pub connected_to_agent_timestamp: DateTime<Utc>,
    pub agent_interaction_duration: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Recording {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VoiceActivity {
    pub talk_time: i64,
    pub listen_time: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Attributes {
    pub customer_first_name: String,
    pub customer_last_name: String,
    pub agent_name: String,
    pub sentiment: String,
    pub resolution: String,
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

pub struct CtrGenerator {
    account_id: String,
    instance_id: String,
}

impl CtrGenerator {
    pub fn new(account_id: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            instance_id: instance_id.into(),
        }
    }

    pub fn generate(&self, count: usize) -> Vec<ContactTraceRecord> {
        self.generate_with(&mut rand::rng(), Utc::now(), count)
    }

    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        now: DateTime<Utc>,
        count: usize,
    ) -> Vec<ContactTraceRecord> {
        (0..count).map(|_| self.record(rng, now)).collect()
    }

    fn record<R: Rng + ?Sized>(&self, rng: &mut R, now: DateTime<Utc>) -> ContactTraceRecord {
        let contact_id = Builder::from_random_bytes(rng.random()).into_uuid().to_string();
        let channel = CHANNELS.choose(rng).copied().unwrap_or(Channel::Voice);

        // Initiation somewhere in the last day, then connect and disconnect
        // strictly after it.
        let back = rng.random_range(0..=24) * 3600
            + rng.random_range(0..=59) * 60
            + rng.random_range(0..=59);
        let initiated = now - Duration::seconds(back);
        let connected = initiated + Duration::seconds(rng.random_range(0..=120));
        let interaction: i64 = rng.random_range(0..=900);
        let disconnected = connected + Duration::seconds(interaction);

        let talk_time = rng.random_range(0..=interaction);
        let listen_time = rng.random_range(0..=interaction - talk_time);

        let location = match channel {
            Channel::Voice => Some(format!("s3://connect-recordings/voice/{contact_id}.wav")),
            Channel::Chat => Some(format!("s3://connect-recordings/chat/{contact_id}.json")),
            Channel::Task => None,
        };
        let recording = location.map(|location| Recording {
            status: if rng.random_bool(0.8) {
                "AVAILABLE".to_string()
            } else {
                "UNAVAILABLE".to_string()
            },
            location: Some(location),
        });
        let customer_voice_activity = (channel == Channel::Voice).then_some(VoiceActivity {
            talk_time,
            listen_time,
        });

        ContactTraceRecord {
            aws_account_id: self.account_id.clone(),
            instance_id: self.instance_id.clone(),
            contact_id: contact_id.clone(),
            channel,
            initiation_timestamp: initiated,
            connected_to_system_timestamp: initiated,
            disconnect_timestamp: disconnected,
            customer_endpoint: Endpoint {
                kind: pick(rng, &PHONE_TYPES).to_string(),
                address: format!("+44{}", rng.random_range(7_000_000_000u64..=7_999_999_999)),
            },
            initial_contact_id: contact_id,
            initiation_method: "INBOUND".to_string(),
            disconnect_reason: pick(rng, &DISCONNECT_REASONS).to_string(),
            queue: QueueInfo {
                queue_name: pick(rng, &QUEUES).to_string(),
                queue_id: format!("queue-{}", rng.random_range(1000..=9999)),
                enqueue_timestamp: initiated,
                dequeue_timestamp: connected,
                duration: (connected - initiated).num_seconds(),
            },
            agent_info: AgentInfo {
                agent_id: format!("agent-{}", rng.random_range(1000..=9999)),
                connected_to_agent_timestamp: connected,
                agent_interaction_duration: interaction,
            },
            recording,
            customer_voice_activity,
            attributes: Attributes {
                customer_first_name: pick(rng, &FIRST_NAMES).to_string(),
                customer_last_name: pick(rng, &LAST_NAMES).to_string(),
                agent_name: pick(rng, &AGENT_NAMES).to_string(),
                sentiment: pick(rng, &SENTIMENTS).to_string(),
                resolution: pick(rng, &RESOLUTIONS).to_string(),
            },
        }
    }
}
