/// Member role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemberRole {
    Admin,
    #[default]
    Member,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Unknown roles fall back to the least-privileged one.
    pub fn from_str(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Self::Admin,
            _ => Self::Member,
        }
    }
}

/// Member model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: MemberRole,
}

impl Member {
    pub fn caller(&self) -> Caller {
        Caller::new(self.id.clone(), self.role)
    }
}

/// Identity of whoever invokes a booking operation.
///
/// Passed explicitly into every service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub member_id: String,
    pub role: MemberRole,
}

impl Caller {
    pub fn new(member_id: impl Into<String>, role: MemberRole) -> Self {
        Self {
            member_id: member_id.into(),
            role,
        }
    }

    pub fn member(member_id: impl Into<String>) -> Self {
        Self::new(member_id, MemberRole::Member)
    }

    pub fn admin(member_id: impl Into<String>) -> Self {
        Self::new(member_id, MemberRole::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin
    }

    /// Owners and admins may mutate or read a booking.
    pub fn may_access(&self, owner_id: &str) -> bool {
        self.is_admin() || self.member_id == owner_id
    }
}
