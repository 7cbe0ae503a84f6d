pub mod filler;
pub mod typeahead;
