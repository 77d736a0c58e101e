//! Shared model and codec for the water permit portal.
//!
//! `model` holds the two shapes an application takes: the flat [`FormModel`]
//! the form widgets edit, and the [`ApplicationRecord`] the storage schema
//! persists. `codec` moves data between them.
//!
//! [`FormModel`]: model::form::FormModel
//! [`ApplicationRecord`]: model::application::ApplicationRecord

pub mod codec;
pub mod model;
pub mod requests;
