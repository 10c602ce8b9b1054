/*
 * Responsibility
 * - events / users の operation handler (query + mutation)
 * - operation → 必要な capability の静的テーブル
 */
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::api::v1::dto::events::{CreateEventArgs, ListEventsArgs, ParticipationArgs};
use crate::api::v1::extractors::RequestCtx;
use crate::repos::event_repo::EventRepo;
use crate::services::auth::rules::{OperationRule, RuleTable, UnlistedPolicy};
use crate::services::gateway::{GatewayError, OperationHandler, OperationRegistry, parse_args};

pub const READ_EVENTS: &str = "read:events";
pub const WRITE_EVENTS: &str = "write:events";
pub const READ_USERS: &str = "read:users";

const DEFAULT_PAGE: usize = 50;

pub fn rules(unlisted: UnlistedPolicy) -> RuleTable {
    RuleTable::new(unlisted)
        .with_rule("ping", OperationRule::Public)
        .with_rule("viewer", OperationRule::Authenticated)
        .with_rule("users", OperationRule::capability(READ_USERS))
        .with_rule("events", OperationRule::capability(READ_EVENTS))
        .with_rule("createEvent", OperationRule::capability(WRITE_EVENTS))
        .with_rule("joinEvent", OperationRule::capability(WRITE_EVENTS))
        .with_rule("unjoinEvent", OperationRule::capability(WRITE_EVENTS))
}

pub fn registry(repo: Arc<EventRepo>) -> OperationRegistry {
    OperationRegistry::new()
        .register("ping", Ping)
        .register("viewer", Viewer)
        .register("users", ListUsers(repo.clone()))
        .register("events", ListEvents(repo.clone()))
        .register("createEvent", CreateEvent(repo.clone()))
        .register("joinEvent", JoinEvent(repo.clone()))
        .register("unjoinEvent", UnjoinEvent(repo))
}

fn to_value<T: serde::Serialize>(v: T) -> Result<Value, GatewayError> {
    serde_json::to_value(v).map_err(|e| {
        tracing::error!(error = %e, "failed to serialize operation result");
        GatewayError::Internal
    })
}

// Explicit name wins; otherwise the verified caller acts on their own behalf.
fn acting_user(ctx: &RequestCtx, explicit: Option<&str>) -> Result<String, GatewayError> {
    if let Some(name) = explicit {
        return Ok(name.trim().to_string());
    }
    ctx.principal()
        .map(|p| p.subject.clone())
        .ok_or_else(|| GatewayError::InvalidArguments("username is required".into()))
}

pub struct Ping;

#[async_trait]
impl OperationHandler for Ping {
    async fn call(&self, _args: Value, _ctx: &RequestCtx) -> Result<Value, GatewayError> {
        Ok(json!("pong"))
    }
}

pub struct Viewer;

#[async_trait]
impl OperationHandler for Viewer {
    async fn call(&self, _args: Value, ctx: &RequestCtx) -> Result<Value, GatewayError> {
        let principal = ctx.principal().ok_or(GatewayError::Unauthenticated)?;
        Ok(json!({
            "subject": principal.subject,
            "issuer": principal.issuer,
            "expiresAt": principal.expires_at,
            "scopes": ctx.capabilities(),
        }))
    }
}

pub struct ListUsers(Arc<EventRepo>);

#[async_trait]
impl OperationHandler for ListUsers {
    async fn call(&self, _args: Value, _ctx: &RequestCtx) -> Result<Value, GatewayError> {
        to_value(self.0.list_users().await)
    }
}

pub struct ListEvents(Arc<EventRepo>);

#[async_trait]
impl OperationHandler for ListEvents {
    async fn call(&self, args: Value, _ctx: &RequestCtx) -> Result<Value, GatewayError> {
        let args: ListEventsArgs = parse_args(args)?;
        let limit = args.first.unwrap_or(DEFAULT_PAGE).min(DEFAULT_PAGE);
        to_value(self.0.list(limit).await)
    }
}

pub struct CreateEvent(Arc<EventRepo>);

#[async_trait]
impl OperationHandler for CreateEvent {
    async fn call(&self, args: Value, ctx: &RequestCtx) -> Result<Value, GatewayError> {
        let args: CreateEventArgs = parse_args(args)?;
        args.validate()
            .map_err(|m| GatewayError::InvalidArguments(m.into()))?;
        let creator = acting_user(ctx, None)?;

        let row = self
            .0
            .create(args.title.trim(), args.date, args.description.as_deref(), &creator)
            .await;
        tracing::info!(event_id = %row.id, creator = %creator, "event created");

        to_value(row)
    }
}

pub struct JoinEvent(Arc<EventRepo>);

#[async_trait]
impl OperationHandler for JoinEvent {
    async fn call(&self, args: Value, ctx: &RequestCtx) -> Result<Value, GatewayError> {
        let args: ParticipationArgs = parse_args(args)?;
        args.validate()
            .map_err(|m| GatewayError::InvalidArguments(m.into()))?;
        let username = acting_user(ctx, args.username.as_deref())?;

        let row = self
            .0
            .add_participant(args.event_id, &username)
            .await
            .ok_or(GatewayError::NotFound("event"))?;

        to_value(row)
    }
}

pub struct UnjoinEvent(Arc<EventRepo>);

#[async_trait]
impl OperationHandler for UnjoinEvent {
    async fn call(&self, args: Value, ctx: &RequestCtx) -> Result<Value, GatewayError> {
        let args: ParticipationArgs = parse_args(args)?;
        args.validate()
            .map_err(|m| GatewayError::InvalidArguments(m.into()))?;
        let username = acting_user(ctx, args.username.as_deref())?;

        let row = self
            .0
            .remove_participant(args.event_id, &username)
            .await
            .ok_or(GatewayError::NotFound("event"))?;

        to_value(row)
    }
}
