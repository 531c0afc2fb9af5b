pub mod flame_examples;
