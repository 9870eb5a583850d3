//! Static table of the API's resource endpoints.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Method;

use crate::{
    validation::{validate_id, validate_pagination, validate_username},
    MelonlyError, Pagination, Result,
};

/// Characters left alone by JavaScript's `encodeURIComponent`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// One resource endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub method: Method,
    /// Path relative to the API root; each `{}` takes one id.
    pub path_template: &'static str,
    /// Field names of the path ids, in order. `username` gets the
    /// username rule, everything else the id rule.
    pub params: &'static [&'static str],
    /// Whether the endpoint accepts `page`/`limit`.
    pub paginated: bool,
}

impl Endpoint {
    const fn get(
        path_template: &'static str,
        params: &'static [&'static str],
        paginated: bool,
    ) -> Self {
        Self {
            method: Method::GET,
            path_template,
            params,
            paginated,
        }
    }

    /// Runs the guard functions for the given ids and pagination.
    pub fn validate(&self, ids: &[&str], pagination: Option<&Pagination>) -> Result<()> {
        if ids.len() != self.params.len() {
            return Err(MelonlyError::validation(
                "path",
                self.path_template,
                format!(
                    "expected {} path parameter(s), got {}",
                    self.params.len(),
                    ids.len()
                ),
            ));
        }
        for (field, id) in self.params.iter().zip(ids) {
            if *field == "username" {
                validate_username(id)?;
            } else {
                validate_id(id, field)?;
            }
        }
        if let Some(pagination) = pagination {
            validate_pagination(pagination)?;
        }
        Ok(())
    }

    /// Fills the template with percent-encoded ids.
    pub fn path(&self, ids: &[&str]) -> String {
        let mut ids = ids.iter();
        let mut path = String::with_capacity(self.path_template.len());
        let mut pieces = self.path_template.split("{}").peekable();
        while let Some(piece) = pieces.next() {
            path.push_str(piece);
            if pieces.peek().is_some() {
                if let Some(id) = ids.next() {
                    path.extend(utf8_percent_encode(id, PATH_SEGMENT));
                }
            }
        }
        path
    }
}

pub const APPLICATIONS: Endpoint = Endpoint::get("/server/applications", &[], true);
pub const APPLICATION: Endpoint =
    Endpoint::get("/server/applications/{}", &["applicationId"], false);
pub const APPLICATION_RESPONSES: Endpoint =
    Endpoint::get("/server/applications/{}/responses", &["applicationId"], true);
pub const USER_APPLICATION_RESPONSES: Endpoint =
    Endpoint::get("/server/applications/user/{}/responses", &["userId"], true);
pub const AUDIT_LOGS: Endpoint = Endpoint::get("/server/audit-logs", &[], true);
pub const SERVER_INFO: Endpoint = Endpoint::get("/server/info", &[], false);
pub const JOIN_REQUESTS: Endpoint = Endpoint::get("/server/join-requests", &[], true);
pub const JOIN_REQUEST: Endpoint = Endpoint::get("/server/join-requests/{}", &["userId"], false);
pub const LOAS: Endpoint = Endpoint::get("/server/loas", &[], true);
pub const LOA: Endpoint = Endpoint::get("/server/loas/{}", &["loaId"], false);
pub const USER_LOAS: Endpoint = Endpoint::get("/server/loas/user/{}", &["memberId"], true);
pub const LOGS: Endpoint = Endpoint::get("/server/logs", &[], true);
pub const LOG: Endpoint = Endpoint::get("/server/logs/{}", &["logId"], false);
pub const STAFF_LOGS: Endpoint = Endpoint::get("/server/logs/staff/{}", &["staffId"], true);
pub const USER_LOGS: Endpoint = Endpoint::get("/server/logs/user/{}", &["username"], true);
pub const MEMBERS: Endpoint = Endpoint::get("/server/members", &[], true);
pub const MEMBER: Endpoint = Endpoint::get("/server/members/{}", &["memberId"], false);
pub const MEMBER_BY_DISCORD_ID: Endpoint =
    Endpoint::get("/server/members/discord/{}", &["discordId"], false);
pub const ROLES: Endpoint = Endpoint::get("/server/roles", &[], true);
pub const ROLE: Endpoint = Endpoint::get("/server/roles/{}", &["roleId"], false);
pub const SHIFTS: Endpoint = Endpoint::get("/server/shifts", &[], true);
pub const SHIFT: Endpoint = Endpoint::get("/server/shifts/{}", &["shiftId"], false);

/// Every endpoint the client knows about.
pub const ALL: &[Endpoint] = &[
    APPLICATIONS,
    APPLICATION,
    APPLICATION_RESPONSES,
    USER_APPLICATION_RESPONSES,
    AUDIT_LOGS,
    SERVER_INFO,
    JOIN_REQUESTS,
    JOIN_REQUEST,
    LOAS,
    LOA,
    USER_LOAS,
    LOGS,
    LOG,
    STAFF_LOGS,
    USER_LOGS,
    MEMBERS,
    MEMBER,
    MEMBER_BY_DISCORD_ID,
    ROLES,
    ROLE,
    SHIFTS,
    SHIFT,
];
