use crate::error::UnsupportedError;

/// `Symbol` is the atomic unit of the external JSON representation: a UTF-8
/// byte (`u8`) or a UTF-16 code unit (`u16`). Every `Reader`/`Writer`
/// operation is generic over `Symbol` so that the compiler monomorphizes
/// each lane into direct code with no runtime branch on width. Only `u8`
/// and `u16` implement this trait; a third lane is rejected by
/// `Symbol::assert_supported`, which the reader and writer call once at
/// construction so the failure is reported as `UnsupportedError` rather
/// than surfacing as a generic-bound compile error deep in caller code.
pub trait Symbol: Copy + Eq + Ord + std::fmt::Debug + Send + Sync + 'static {
    /// Bytes occupied by one symbol in the host representation.
    const WIDTH: usize;

    fn from_ascii(b: u8) -> Self;
    fn as_u32(self) -> u32;
    fn try_from_u32(v: u32) -> Option<Self>;

    /// Guards the `WIDTH == 1 || WIDTH == 2` invariant at runtime. With the
    /// only two trait impls below this never fails; it exists so an
    /// unsupported symbol width has a concrete error path rather than being
    /// an unreachable comment.
    fn assert_supported() -> Result<(), UnsupportedError> {
        match Self::WIDTH {
            1 | 2 => Ok(()),
            other => Err(UnsupportedError::SymbolWidth(other)),
        }
    }
}

impl Symbol for u8 {
    const WIDTH: usize = 1;

    #[inline]
    fn from_ascii(b: u8) -> Self {
        b
    }
    #[inline]
    fn as_u32(self) -> u32 {
        self as u32
    }
    #[inline]
    fn try_from_u32(v: u32) -> Option<Self> {
        u8::try_from(v).ok()
    }
}

impl Symbol for u16 {
    const WIDTH: usize = 2;

    #[inline]
    fn from_ascii(b: u8) -> Self {
        b as u16
    }
    #[inline]
    fn as_u32(self) -> u32 {
        self as u32
    }
    #[inline]
    fn try_from_u32(v: u32) -> Option<Self> {
        u16::try_from(v).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_are_supported() {
        assert!(u8::assert_supported().is_ok());
        assert!(u16::assert_supported().is_ok());
        assert_eq!(u8::WIDTH, 1);
        assert_eq!(u16::WIDTH, 2);
    }
}
