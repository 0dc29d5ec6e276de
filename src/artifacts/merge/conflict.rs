pub const CURRENT_MARKER: &str = "<<<<<<< HEAD\n";
pub const SEPARATOR_MARKER: &str = "=======\n";
pub const END_MARKER: &str = ">>>>>>>\n";

/// Working-tree content of a conflicted path; an absent side contributes nothing
pub fn conflict_block(current: Option<&[u8]>, other: Option<&[u8]>) -> Vec<u8> {
    let current = current.unwrap_or_default();
    let other = other.unwrap_or_default();

    let mut block = Vec::with_capacity(
        CURRENT_MARKER.len() + current.len() + SEPARATOR_MARKER.len() + other.len() + END_MARKER.len(),
    );
    block.extend_from_slice(CURRENT_MARKER.as_bytes());
    block.extend_from_slice(current);
    block.extend_from_slice(SEPARATOR_MARKER.as_bytes());
    block.extend_from_slice(other);
    block.extend_from_slice(END_MARKER.as_bytes());

    block
}
