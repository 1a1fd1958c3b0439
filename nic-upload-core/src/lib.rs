#![doc = "nic-upload-core: core logic library for nic-upload."]

//! This crate holds the state and logic of a NIC validation batch upload:
//! the working file set, the submission state machine and the reconciliation of
//! the validation service's response into a per-file report.
//! Transport and credential storage are reached through the traits in [`contract`];
//! concrete implementations live in the CLI crate.
//!
//! # Usage
//! Build an [`session::UploadSession`], feed it files, and drive a submission with a
//! [`submitter::BatchSubmitter`].

pub mod accumulator;
pub mod contract;
pub mod reconcile;
pub mod session;
pub mod submitter;
