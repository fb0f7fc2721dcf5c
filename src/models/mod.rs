//! Request and Response models for the admin API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    GetQuery, KeysQuery, NsKeyRequest, PutRequest, RemoveMemberRequest, RemoveQuery,
    SetOpRequest, SizeQuery,
};
pub use responses::{
    FlushResponse, GetResponse, HealthResponse, InfoResponse, KeysResponse, NsKeyResponse,
    PutResponse, RemoveMemberResponse, RemoveResponse, SetOpResponse, SizeResponse,
};
