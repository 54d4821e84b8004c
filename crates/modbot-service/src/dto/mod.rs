//! Data transfer objects for commands and their outcomes
//!
//! This module provides:
//! - The tagged `Command` enum and its validated payloads
//! - Response DTOs for serializing command outcomes
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    AddQuoteRequest, AnnounceRequest, ChannelRequest, Command, CreateRolePickerRequest,
    DispatchRequest, MemberRoleRequest, MuteRequest, OpenTicketRequest, PickRoleRequest,
    RecentActionsRequest, RecordActionRequest, RemoveQuoteRequest, SanctionRequest,
    SessionRequest, SlowmodeRequest, StartGiveawayRequest, StartPollRequest, SubjectRequest,
    SuggestRequest, ToggleVoteRequest,
};

pub use responses::{
    ChannelLockResponse, CommandOutcome, CommandPayload, GiveawayStartedResponse, HealthChecks,
    HealthResponse, MessagePostedResponse, ModerationActionResponse, MuteResponse,
    PollStartedResponse, QuoteResponse, ReadinessResponse, RolePickerStartedResponse,
    RoleToggledResponse, SettingUpdatedResponse, SlowmodeResponse, TicketOpenedResponse,
};
