//! # Audio Module
//!
//! Motor de reproducción por guild.
//!
//! Cada guild con el bot en un canal de voz tiene una [`MusicSubscription`]
//! que posee:
//! - la conexión de voz supervisada ([`connection`], [`supervisor`])
//! - un reproductor principal y otro para anuncios hablados ([`player`])
//! - la cola de tracks pendientes ([`queue`])
//! - un watchdog que libera la conexión tras un rato sin reproducir ([`watchdog`])
//!
//! Las suscripciones viven en el [`SubscriptionRegistry`], que se crea al
//! arrancar y se comparte a través del `TypeMap` de serenity.
//!
//! ## Flujo
//!
//! ```text
//! comando -> registry.get_or_create -> subscription.enqueue
//!         -> dequeue -> resolver -> reproductor principal
//!         -> Idle -> siguiente track | watchdog
//! ```
//!
//! [`MusicSubscription`]: subscription::MusicSubscription
//! [`SubscriptionRegistry`]: registry::SubscriptionRegistry

pub mod connection;
pub mod driver;
pub mod error;
pub mod events;
pub mod notifier;
pub mod player;
pub mod queue;
pub mod registry;
pub mod subscription;
pub mod supervisor;
pub mod track;
pub mod watchdog;

#[cfg(test)]
pub(crate) mod testing;
