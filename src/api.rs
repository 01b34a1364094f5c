pub mod health;
pub mod owner;
pub mod swagger_main;
pub mod task_item;

#[cfg(test)]
pub mod test_util;
