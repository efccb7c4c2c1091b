
// Execution and dispatch tests
mod dispatch_rules;
mod execution;

mod fractions;
mod fuzzy_logic;
mod ranges_distributions;
