//! Access policy: which role may do what.

use uuid::Uuid;

use crate::web::{AuthenticatedUser, UserRole};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    ManageCourses,
    ManageUsers,
    ManageConsultationSlots,
    ViewAllConsultations,
    CancelConsultation { owner_id: Uuid },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    AdminRequired,
    NotOwner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

pub fn authorize(user: &AuthenticatedUser, permission: &Permission) -> Decision {
    let is_admin = user.user_role() == UserRole::Admin;

    match permission {
        Permission::ManageCourses
        | Permission::ManageUsers
        | Permission::ManageConsultationSlots
        | Permission::ViewAllConsultations => {
            if is_admin {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::AdminRequired)
            }
        }
        Permission::CancelConsultation { owner_id } => {
            if is_admin || *owner_id == user.user_id() {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::NotOwner)
            }
        }
    }
}
