pub mod restaurant;
