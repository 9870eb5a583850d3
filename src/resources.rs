//! Typed methods for every resource endpoint.
//!
//! Each method validates its ids and pagination locally, then hands the
//! request to [`MelonlyClient::execute`].

use serde::de::DeserializeOwned;

use crate::{
    endpoints::{self, Endpoint},
    transport::Transport,
    types::{
        Application, ApplicationResponse, AuditLogEvent, JoinRequest, Loa, Log, Member, Paginated,
        Role, Server, Shift,
    },
    ApiRequest, MelonlyClient, Pagination, Result,
};

impl<T: Transport> MelonlyClient<T> {
    /// Validates and executes a call to a table endpoint.
    pub async fn call<R: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        ids: &[&str],
        pagination: Option<Pagination>,
    ) -> Result<R> {
        endpoint.validate(ids, pagination.as_ref())?;
        let mut request = ApiRequest::new(endpoint.method.clone(), endpoint.path(ids));
        if let Some(pagination) = pagination {
            request = request.with_query(pagination);
        }
        self.execute(request).await
    }

    // --- Applications ---

    /// Lists applications.
    pub async fn get_applications(&self, params: Pagination) -> Result<Paginated<Application>> {
        self.call(&endpoints::APPLICATIONS, &[], Some(params)).await
    }

    /// Fetches one application.
    pub async fn get_application(&self, application_id: &str) -> Result<Application> {
        self.call(&endpoints::APPLICATION, &[application_id], None)
            .await
    }

    /// Lists responses to one application.
    pub async fn get_application_responses(
        &self,
        application_id: &str,
        params: Pagination,
    ) -> Result<Paginated<ApplicationResponse>> {
        self.call(
            &endpoints::APPLICATION_RESPONSES,
            &[application_id],
            Some(params),
        )
        .await
    }

    /// Application responses submitted by one user.
    pub async fn get_user_application_responses(
        &self,
        user_id: &str,
        params: Pagination,
    ) -> Result<Paginated<ApplicationResponse>> {
        self.call(
            &endpoints::USER_APPLICATION_RESPONSES,
            &[user_id],
            Some(params),
        )
        .await
    }

    // --- Audit logs ---

    /// Lists audit log events.
    pub async fn get_audit_logs(&self, params: Pagination) -> Result<Paginated<AuditLogEvent>> {
        self.call(&endpoints::AUDIT_LOGS, &[], Some(params)).await
    }

    // --- Server ---

    /// Fetches the server the token belongs to.
    pub async fn get_server_info(&self) -> Result<Server> {
        self.call(&endpoints::SERVER_INFO, &[], None).await
    }

    // --- Join requests ---

    /// Lists pending join requests.
    pub async fn get_join_requests(&self, params: Pagination) -> Result<Paginated<JoinRequest>> {
        self.call(&endpoints::JOIN_REQUESTS, &[], Some(params)).await
    }

    /// Fetches the join request of one user.
    pub async fn get_join_request(&self, user_id: &str) -> Result<JoinRequest> {
        self.call(&endpoints::JOIN_REQUEST, &[user_id], None).await
    }

    // --- Leaves of absence ---

    /// Lists leaves of absence.
    pub async fn get_loas(&self, params: Pagination) -> Result<Paginated<Loa>> {
        self.call(&endpoints::LOAS, &[], Some(params)).await
    }

    /// Fetches one leave of absence.
    pub async fn get_loa(&self, loa_id: &str) -> Result<Loa> {
        self.call(&endpoints::LOA, &[loa_id], None).await
    }

    /// Leaves of absence of one member.
    pub async fn get_user_loas(
        &self,
        member_id: &str,
        params: Pagination,
    ) -> Result<Paginated<Loa>> {
        self.call(&endpoints::USER_LOAS, &[member_id], Some(params))
            .await
    }

    // --- Logs ---

    /// Lists logs.
    pub async fn get_logs(&self, params: Pagination) -> Result<Paginated<Log>> {
        self.call(&endpoints::LOGS, &[], Some(params)).await
    }

    /// Fetches one log.
    pub async fn get_log(&self, log_id: &str) -> Result<Log> {
        self.call(&endpoints::LOG, &[log_id], None).await
    }

    /// Logs created by one staff member.
    pub async fn get_staff_logs(
        &self,
        staff_id: &str,
        params: Pagination,
    ) -> Result<Paginated<Log>> {
        self.call(&endpoints::STAFF_LOGS, &[staff_id], Some(params))
            .await
    }

    /// Logs about one user, looked up by username.
    pub async fn get_user_logs(
        &self,
        username: &str,
        params: Pagination,
    ) -> Result<Paginated<Log>> {
        self.call(&endpoints::USER_LOGS, &[username], Some(params))
            .await
    }

    // --- Members ---

    /// Lists members.
    pub async fn get_members(&self, params: Pagination) -> Result<Paginated<Member>> {
        self.call(&endpoints::MEMBERS, &[], Some(params)).await
    }

    /// Fetches one member by id.
    pub async fn get_member(&self, member_id: &str) -> Result<Member> {
        self.call(&endpoints::MEMBER, &[member_id], None).await
    }

    /// Fetches one member by Discord user id.
    pub async fn get_member_by_discord_id(&self, discord_id: &str) -> Result<Member> {
        self.call(&endpoints::MEMBER_BY_DISCORD_ID, &[discord_id], None)
            .await
    }

    // --- Roles ---

    /// Lists roles.
    pub async fn get_roles(&self, params: Pagination) -> Result<Paginated<Role>> {
        self.call(&endpoints::ROLES, &[], Some(params)).await
    }

    /// Fetches one role.
    pub async fn get_role(&self, role_id: &str) -> Result<Role> {
        self.call(&endpoints::ROLE, &[role_id], None).await
    }

    // --- Shifts ---

    /// Lists shifts.
    pub async fn get_shifts(&self, params: Pagination) -> Result<Paginated<Shift>> {
        self.call(&endpoints::SHIFTS, &[], Some(params)).await
    }

    /// Fetches one shift.
    pub async fn get_shift(&self, shift_id: &str) -> Result<Shift> {
        self.call(&endpoints::SHIFT, &[shift_id], None).await
    }
}
