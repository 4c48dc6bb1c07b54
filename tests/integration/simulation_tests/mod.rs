mod evaluators;
mod flight;
mod listeners;
