//! Infrastructure services

mod characterization_service;

pub use characterization_service::{
    CharacterizationService, RequestFailure, RequestStage,
};
