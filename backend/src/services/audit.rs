use serde::Serialize;
use std::fmt;

/// Security audit events for tenant accounts and streaming grants
#[derive(Debug, Clone, Serialize)]
pub enum AuditEvent {
    /// New venue and owner registered
    TenantRegistered {
        tenant_id: String,
        user_id: String,
        email: String,
    },
    /// Credentials accepted
    LoginSucceeded {
        tenant_id: String,
        user_id: String,
        email: String,
    },
    /// Credentials rejected or account unusable
    LoginFailed {
        email: String,
        reason: String,
    },
    /// Signed URL issued
    StreamAuthorized {
        tenant_id: String,
        track_id: String,
        authorized_duration: i64,
    },
    /// Stream request refused
    StreamDenied {
        tenant_id: String,
        track_id: String,
        reason: String,
    },
    /// Plan changed by a tenant manager
    PlanChanged {
        tenant_id: String,
        user_id: String,
        plan: String,
    },
    /// Tenant activated, deactivated or deleted by a system administrator
    TenantStatusChanged {
        tenant_id: String,
        user_id: String,
        status: String,
    },
    /// A session tried to act on another tenant's data
    TenantMismatch {
        token_tenant_id: String,
        requested_tenant_id: String,
        user_id: String,
    },
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TenantRegistered { tenant_id, email, .. } => {
                write!(f, "Tenant {tenant_id} registered by {email}")
            }
            Self::LoginSucceeded { tenant_id, email, .. } => {
                write!(f, "Login succeeded for {email} (tenant {tenant_id})")
            }
            Self::LoginFailed { email, reason } => {
                write!(f, "Login failed for {email}: {reason}")
            }
            Self::StreamAuthorized { tenant_id, track_id, authorized_duration } => {
                write!(f, "Stream of track {track_id} authorized for tenant {tenant_id} ({authorized_duration}s)")
            }
            Self::StreamDenied { tenant_id, track_id, reason } => {
                write!(f, "Stream of track {track_id} denied for tenant {tenant_id}: {reason}")
            }
            Self::PlanChanged { tenant_id, user_id, plan } => {
                write!(f, "Tenant {tenant_id} moved to {plan} by user {user_id}")
            }
            Self::TenantStatusChanged { tenant_id, user_id, status } => {
                write!(f, "Tenant {tenant_id} is now {status} (by user {user_id})")
            }
            Self::TenantMismatch { token_tenant_id, requested_tenant_id, user_id } => {
                write!(f, "User {user_id} of tenant {token_tenant_id} requested tenant {requested_tenant_id}")
            }
        }
    }
}

/// Log audit event with structured data
pub fn log_audit_event(event: &AuditEvent) {
    match event {
        AuditEvent::TenantMismatch { .. } | AuditEvent::LoginFailed { .. } => {
            tracing::warn!(
                event_type = "security_audit",
                event = ?event,
                message = %event,
                "Security event"
            );
        }
        AuditEvent::StreamDenied { .. } => {
            tracing::warn!(
                event_type = "stream_audit",
                event = ?event,
                message = %event,
                "Stream denied"
            );
        }
        _ => {
            tracing::info!(
                event_type = "audit",
                event = ?event,
                message = %event,
                "Audit event"
            );
        }
    }
}
