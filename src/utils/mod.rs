pub mod block_list;
pub mod string_utils;
