#![allow(dead_code)]

pub mod annotations;
pub mod recordings;
pub mod scoring;
