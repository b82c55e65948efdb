use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// The slice of the user record the quota gate cares about. The rest of the
/// users table belongs to the auth collaborator.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct VipStatus {
    pub is_vip: bool,
    pub vip_expire_at: Option<DateTime<Utc>>,
}

impl VipStatus {
    /// VIP is only effective while unexpired. A missing expiry means inactive.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.is_vip && self.vip_expire_at.map(|t| t > now).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_vip_active_while_unexpired() {
        let status = VipStatus {
            is_vip: true,
            vip_expire_at: Some(Utc::now() + Duration::days(30)),
        };
        assert!(status.is_active(Utc::now()));
    }

    #[test]
    fn test_vip_inactive_after_expiry() {
        let status = VipStatus {
            is_vip: true,
            vip_expire_at: Some(Utc::now() - Duration::days(1)),
        };
        assert!(!status.is_active(Utc::now()));
    }

    #[test]
    fn test_vip_flag_without_expiry_is_inactive() {
        let status = VipStatus {
            is_vip: true,
            vip_expire_at: None,
        };
        assert!(!status.is_active(Utc::now()));
    }

    #[test]
    fn test_non_vip_is_inactive() {
        let status = VipStatus {
            is_vip: false,
            vip_expire_at: Some(Utc::now() + Duration::days(30)),
        };
        assert!(!status.is_active(Utc::now()));
    }
}
