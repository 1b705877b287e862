use crate::LayoutError;

/// Appends `item`, reporting allocation failure instead of aborting.
///
/// A distribution pass that hits this must be discarded as a whole.
pub fn try_push<T>(vec: &mut Vec<T>, item: T, what: &'static str) -> Result<(), LayoutError> {
    vec.try_reserve(1)
        .map_err(|_| LayoutError::OutOfMemory(what))?;
    vec.push(item);
    Ok(())
}

/// Inserts `item` at `index`, reporting allocation failure instead of aborting.
pub fn try_insert<T>(
    vec: &mut Vec<T>,
    index: usize,
    item: T,
    what: &'static str,
) -> Result<(), LayoutError> {
    vec.try_reserve(1)
        .map_err(|_| LayoutError::OutOfMemory(what))?;
    vec.insert(index, item);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_push_appends() {
        let mut v = vec![1, 2];
        try_push(&mut v, 3, "number").unwrap();
        assert_eq!(v, vec![1, 2, 3]);
    }

    #[test]
    fn try_insert_keeps_order() {
        let mut v = vec![1, 3];
        try_insert(&mut v, 1, 2, "number").unwrap();
        assert_eq!(v, vec![1, 2, 3]);
    }
}
