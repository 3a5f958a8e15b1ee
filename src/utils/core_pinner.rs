use core_affinity::{CoreId, get_core_ids, set_for_current};

/// Number of cores the OS lets this process use.
pub fn available_cores() -> usize {
    get_core_ids().map(|ids| ids.len()).unwrap_or(0)
}

/// Pin the calling thread to `core_id`.
pub fn try_pin_core(core_id: usize) -> anyhow::Result<usize> {
    if let Some(core_ids) = get_core_ids()
        && core_ids.iter().any(|c| c.id == core_id)
        && set_for_current(CoreId { id: core_id })
    {
        return Ok(core_id);
    }
    Err(anyhow::anyhow!("failed to pin core {core_id}"))
}
