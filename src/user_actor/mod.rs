//! Account records managed by a generic [`ResourceActor`](crate::actor_framework::ResourceActor).

pub mod entity;
