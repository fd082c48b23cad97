//! Builders for the fully qualified future ids used as journal keys.
//!
//! A full id is `<module>#<local>`; ids for sub-operations append `.` keyed
//! segments, submodule contract references use `~`.

pub const MODULE_SEPARATOR: char = '#';
pub const SUBMODULE_SEPARATOR: char = '~';
pub const SUBKEY_SEPARATOR: char = '.';

pub fn is_full_future_id(id: &str) -> bool {
    id.contains(MODULE_SEPARATOR)
}

pub fn to_full_future_id(module_id: &str, local_id: &str) -> String {
    if is_full_future_id(local_id) {
        return local_id.to_string();
    }
    format!("{module_id}{MODULE_SEPARATOR}{local_id}")
}

pub fn to_contract_future_id(module_id: &str, user_provided_id: Option<&str>, contract_or_library_name: &str) -> String {
    to_full_future_id(module_id, user_provided_id.unwrap_or(contract_or_library_name))
}

/// Calls on a contract from another module are prefixed with that module's id
/// so that `Other#Token` called from `M` becomes `M#Other~Token.transfer`.
pub fn to_call_future_id(
    module_id: &str,
    user_provided_id: Option<&str>,
    contract_module_id: &str,
    contract_id: &str,
    function_name: &str,
) -> String {
    if let Some(id) = user_provided_id {
        return to_full_future_id(module_id, id);
    }
    let contract_name = local_part(contract_id);
    if module_id == contract_module_id {
        return format!("{module_id}{MODULE_SEPARATOR}{contract_name}{SUBKEY_SEPARATOR}{function_name}");
    }
    format!(
        "{module_id}{MODULE_SEPARATOR}{contract_module_id}{SUBMODULE_SEPARATOR}{contract_name}{SUBKEY_SEPARATOR}{function_name}"
    )
}

pub fn to_encode_function_call_future_id(
    module_id: &str,
    user_provided_id: Option<&str>,
    contract_module_id: &str,
    contract_id: &str,
    function_name: &str,
) -> String {
    if let Some(id) = user_provided_id {
        return to_full_future_id(module_id, id);
    }
    let contract_name = local_part(contract_id);
    if module_id == contract_module_id {
        return format!("{module_id}{MODULE_SEPARATOR}encodeFunctionCall({contract_name}{SUBKEY_SEPARATOR}{function_name})");
    }
    format!(
        "{module_id}{MODULE_SEPARATOR}encodeFunctionCall({contract_module_id}{SUBMODULE_SEPARATOR}{contract_name}{SUBKEY_SEPARATOR}{function_name})"
    )
}

pub fn to_read_event_argument_future_id(
    module_id: &str,
    user_provided_id: Option<&str>,
    contract_name: &str,
    event_name: &str,
    name_or_index: &str,
    event_index: u64,
) -> String {
    if let Some(id) = user_provided_id {
        return to_full_future_id(module_id, id);
    }
    format!(
        "{module_id}{MODULE_SEPARATOR}{contract_name}{SUBKEY_SEPARATOR}{event_name}{SUBKEY_SEPARATOR}{name_or_index}{SUBKEY_SEPARATOR}{event_index}"
    )
}

pub fn to_send_data_future_id(module_id: &str, id: &str) -> String {
    to_full_future_id(module_id, id)
}

/// Module part of a full future id.
pub fn module_part(future_id: &str) -> &str {
    future_id
        .split_once(MODULE_SEPARATOR)
        .map(|(module, _)| module)
        .unwrap_or(future_id)
}

fn local_part(future_id: &str) -> &str {
    future_id
        .split_once(MODULE_SEPARATOR)
        .map(|(_, local)| local)
        .unwrap_or(future_id)
}

#[cfg(test)]
#[path = "future_id_test.rs"]
mod tests;
