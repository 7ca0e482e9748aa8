//! Role authority: the pure permission tables for the approval workflow
//!
//! Every predicate here is a stateless lookup. Combinations outside the
//! tables are denied.

use super::actor::{Actor, Role};
use super::request::{Domain, MissionType};

/// Whether a role may record a decision on a request of the given domain.
pub fn can_decide(role: Role, domain: Domain) -> bool {
    match domain {
        Domain::Leave => matches!(role, Role::Hod | Role::Dean | Role::Hr),
        Domain::Mission(MissionType::Local) => matches!(
            role,
            Role::Hod | Role::Dean | Role::CampusAdmin | Role::FinancialManager
        ),
        Domain::Mission(MissionType::International) => {
            matches!(role, Role::Hod | Role::Dean | Role::Principal | Role::Vc)
        }
    }
}

/// The single role whose APPROVED decision finalizes a request of the given
/// domain. Rejections are decisive for any permitted role.
pub fn decisive_role(domain: Domain) -> Role {
    match domain {
        Domain::Leave => Role::Hr,
        Domain::Mission(MissionType::Local) => Role::FinancialManager,
        Domain::Mission(MissionType::International) => Role::Vc,
    }
}

pub fn is_decisive(role: Role, domain: Domain) -> bool {
    role == decisive_role(domain)
}

/// Whose signature goes on the generated record for an approved request.
pub fn can_sign(role: Role, domain: Domain) -> bool {
    match domain {
        Domain::Leave => role == Role::Hr,
        Domain::Mission(MissionType::Local) => role == Role::CampusAdmin,
        Domain::Mission(MissionType::International) => role == Role::Vc,
    }
}

/// The visibility predicate, applied at the persistence query boundary.
/// Owners always see their own requests; approver roles see the slice of
/// the keyspace they are responsible for.
pub fn can_view(actor: &Actor, owner: &Actor, domain: Domain) -> bool {
    if actor.id == owner.id {
        return true;
    }

    match actor.role {
        Role::Employee => false,
        Role::Hod => actor.department == owner.department,
        Role::Dean => true,
        Role::CampusAdmin | Role::FinancialManager => {
            domain == Domain::Mission(MissionType::Local)
        }
        Role::Principal | Role::Vc => domain == Domain::Mission(MissionType::International),
        Role::Hr => domain == Domain::Leave,
    }
}
