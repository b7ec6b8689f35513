pub mod db_utils;
pub mod integrity;
pub mod models;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_utils;
