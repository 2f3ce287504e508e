mod resolver;

pub use resolver::{
    delete_at_path, find_array_paths, get_at_path, get_at_path_mut, has_wildcard, json_type_name,
    resolve_wildcard_paths, set_at_path, split_path,
};
