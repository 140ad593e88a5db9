/// Fixed field capacity every `ClassInstance` is allocated with (spec §4.4.4:
/// "the simplified implementation uses 4 words").
pub const FIELD_SLOTS: usize = 4;

/// Maps a field name to one of a `ClassInstance`'s fixed slots. Collisions
/// are possible (two distinct field names can hash to the same slot) and are
/// accepted by the simplified model in exchange for not tracking a per-class
/// field layout.
pub fn field_slot(name: &str) -> usize {
    name.bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32)) as usize
        % FIELD_SLOTS
}

/// Which shape of heap record this is (spec §3: "a tagged record with
/// `kind ∈ {ClassInstance, PrimitiveArray, RefArray, String}`").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapKind {
    ClassInstance,
    PrimitiveArray { element_type: u8 },
    RefArray,
    String,
}

/// A heap-allocated object, array, or string: `kind`, a logical `size`
/// (fields or elements), a flat vector of 32-bit words, and the resolved
/// runtime class name (spec §3).
#[derive(Debug, Clone)]
pub struct HeapObject {
    pub kind: HeapKind,
    pub class_name: String,
    pub size: usize,
    pub words: Vec<u32>,
}

impl HeapObject {
    pub fn class_instance(class_name: impl Into<String>) -> Self {
        Self {
            kind: HeapKind::ClassInstance,
            class_name: class_name.into(),
            size: FIELD_SLOTS,
            words: vec![0; FIELD_SLOTS],
        }
    }

    /// An allocated exception object: no fields are modeled, only the class
    /// name the handler search and any diagnostic needs (spec §4.4.7).
    pub fn exception(class_name: impl Into<String>) -> Self {
        Self {
            kind: HeapKind::ClassInstance,
            class_name: class_name.into(),
            size: 0,
            words: Vec::new(),
        }
    }

    pub fn primitive_array(element_type: u8, length: usize) -> Self {
        Self {
            kind: HeapKind::PrimitiveArray { element_type },
            class_name: format!("[{element_type}"),
            size: length,
            words: vec![0; length],
        }
    }

    /// `anewarray`'s element-type metadata is the descriptor text `"[L<class>;"` (spec §4.4.4).
    pub fn ref_array(element_class: impl Into<String>, length: usize) -> Self {
        Self {
            kind: HeapKind::RefArray,
            class_name: format!("[L{};", element_class.into()),
            size: length,
            words: vec![0; length],
        }
    }

    /// A `ldc`-allocated String: each data word holds one byte of the literal (spec §4.4.4).
    pub fn string(bytes: &[u8]) -> Self {
        Self {
            kind: HeapKind::String,
            class_name: "java/lang/String".to_string(),
            size: bytes.len(),
            words: bytes.iter().map(|&b| b as u32).collect(),
        }
    }
}

/// The allocator-owned store of objects and arrays (spec §GLOSSARY). Index 0
/// is the permanent null sentinel; index 1 is a reserved pseudo-object that
/// `getstatic`'s stub (spec §4.4.3) always resolves to, standing in for the
/// `PrintStream` the interpreter never really loads.
#[derive(Debug)]
pub struct Heap {
    objects: Vec<HeapObject>,
}

impl Heap {
    pub const PRINT_SINK_REF: u32 = 1;

    pub fn new() -> Self {
        let null_sentinel = HeapObject::exception(String::new());
        let print_sink = HeapObject::class_instance("java/io/PrintStream");
        Heap {
            objects: vec![null_sentinel, print_sink],
        }
    }

    /// Allocates `obj`, returning its reference. Never returns 0.
    pub fn allocate(&mut self, obj: HeapObject) -> u32 {
        self.objects.push(obj);
        (self.objects.len() - 1) as u32
    }

    /// Resolves a reference to its object. `0` (the null sentinel) always
    /// resolves to `None`, regardless of how many objects are allocated.
    pub fn get(&self, reference: u32) -> Option<&HeapObject> {
        if reference == 0 {
            None
        } else {
            self.objects.get(reference as usize)
        }
    }

    pub fn get_mut(&mut self, reference: u32) -> Option<&mut HeapObject> {
        if reference == 0 {
            None
        } else {
            self.objects.get_mut(reference as usize)
        }
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn null_sentinel_never_resolves() {
        let heap = Heap::new();
        assert!(heap.get(0).is_none());
    }

    #[test]
    fn allocate_never_returns_zero() {
        let mut heap = Heap::new();
        let r = heap.allocate(HeapObject::class_instance("Foo"));
        assert_ne!(r, 0);
        assert_eq!(heap.get(r).unwrap().class_name, "Foo");
    }

    #[test]
    fn field_slot_is_bounded() {
        for name in ["x", "count", "aVeryLongFieldNameIndeed", ""] {
            assert!(field_slot(name) < FIELD_SLOTS);
        }
    }
}
