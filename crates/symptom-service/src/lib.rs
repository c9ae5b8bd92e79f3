//! # symptom-service
//!
//! gRPC service for symptom extraction and disease prediction.
//!
//! This crate exposes the pipeline of the symptom-engine crate over tonic:
//! listing the symptom vocabulary, extracting symptoms from free text and
//! predicting diseases from text or symptom codes.

#![warn(missing_docs)]

#[allow(missing_docs)]
pub mod proto {
    //! Generated protobuf types.
    tonic::include_proto!("symptom");
}

mod server;

pub use server::SymptomServer;
