//! Authorization policy.
//!
//! One pure decision function over (caller, operation). Handlers consult it
//! before touching any store, so the whole allow-list lives in this table and
//! can be tested without a transport.

use super::Role;

/// Authenticated identity resolved from a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: i32,
    pub role: Role,
}

impl Caller {
    pub fn new(id: i32, role: Role) -> Self {
        Self { id, role }
    }
}

/// Operations subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    // Identity
    Register,
    Login,
    ReadProfile { account_id: i32 },
    UpdateProfile { account_id: i32 },
    ListAccounts,
    ListStudents,

    // Attendance
    RecordAttendance,
    ReadAllAttendance,
    ReadOwnRecordings,
    ReadStudentAttendance { student_id: i32 },
    ReadAttendanceStats { student_id: Option<i32> },
    ReadAttendanceByDateRange,
    ReadClassAttendance,
    UpdateAttendance,
    DeleteAttendance,

    // Classes & roster
    ReadClasses,
    ManageClass,
    ManageEnrollment,
    ReadAvailableStudents,
    ReadRoster,
    ReadMyClasses,
}

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    fn when(condition: bool) -> Self {
        if condition {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// Decide whether `caller` may perform `operation`.
///
/// `None` stands for an unauthenticated request; only registration and login
/// accept it.
pub fn decide(caller: Option<&Caller>, operation: Operation) -> Decision {
    use Operation::*;

    let caller = match (caller, operation) {
        (_, Register | Login) => return Decision::Allow,
        (None, _) => return Decision::Deny,
        (Some(caller), _) => caller,
    };
    let role = caller.role;

    match operation {
        Register | Login => Decision::Allow,

        ReadProfile { account_id } | UpdateProfile { account_id } => {
            Decision::when(account_id == caller.id)
        }
        ListAccounts => Decision::when(role.is_admin()),
        ListStudents => Decision::when(role.is_staff()),

        RecordAttendance | ReadOwnRecordings | ReadAttendanceByDateRange
        | ReadClassAttendance | UpdateAttendance => Decision::when(role.is_staff()),
        ReadAllAttendance | DeleteAttendance => Decision::when(role.is_admin()),
        ReadStudentAttendance { student_id } => {
            Decision::when(role.is_staff() || student_id == caller.id)
        }
        ReadAttendanceStats { student_id } => match student_id {
            Some(target) if role.is_student() => Decision::when(target == caller.id),
            _ => Decision::Allow,
        },

        ReadClasses | ReadRoster => Decision::Allow,
        ManageClass | ManageEnrollment | ReadAvailableStudents => {
            Decision::when(role.is_admin())
        }
        ReadMyClasses => Decision::when(role.is_student()),
    }
}

/// Effective target of a statistics request once it has been allowed.
///
/// Students are always scoped to themselves; for staff `None` means the
/// global aggregate.
pub fn stats_scope(caller: &Caller, requested: Option<i32>) -> Option<i32> {
    if caller.role.is_student() {
        Some(caller.id)
    } else {
        requested
    }
}
