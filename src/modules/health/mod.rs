// Liveness endpoint

pub mod controllers;
