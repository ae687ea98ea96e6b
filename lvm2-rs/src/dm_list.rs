//! Traversal of the circular `dm_list` chains the engine hands back.

use std::ffi::CStr;

use lvm2_sys::{dm_list, lvm_str_list};
use snafu::ResultExt;

use crate::error::{DecodeError, LvmResult};

/// Iterator over the entry nodes of a native `dm_list`.
///
/// The head is a sentinel node, not an entry: an empty list is a head whose
/// `n` pointer refers back to itself. Termination is decided by comparing a
/// node's successor against the head, never by a null check, so traversal
/// finishes on the circular representation and a one-element list yields
/// exactly one node. The list is never mutated.
pub(crate) struct DmListIter {
    head: *const dm_list,
    cur: *const dm_list,
}

impl DmListIter {
    /// # Safety
    ///
    /// `head` must point at the sentinel head of a well-formed `dm_list`
    /// that outlives the iterator.
    pub(crate) unsafe fn new(head: *const dm_list) -> Self {
        DmListIter { head, cur: head }
    }
}

impl Iterator for DmListIter {
    type Item = *const dm_list;

    fn next(&mut self) -> Option<Self::Item> {
        // Reading head.n on the first step is the dm_list_empty() test; no
        // entry node is touched for an empty list.
        let next = unsafe { (*self.cur).n as *const dm_list };
        if next == self.head {
            None
        } else {
            self.cur = next;
            Some(next)
        }
    }
}

/// Decode a single engine string. ASCII in practice, checked as UTF-8.
pub(crate) unsafe fn decode_cstr(ptr: *const libc::c_char) -> LvmResult<String> {
    let s = CStr::from_ptr(ptr).to_str().context(DecodeError {})?;
    Ok(s.to_string())
}

/// Translate a `lvm_str_list` chain into owned strings, in list order.
pub(crate) unsafe fn decode_str_list(head: *const dm_list) -> LvmResult<Vec<String>> {
    let mut out = Vec::new();
    for node in DmListIter::new(head) {
        let entry = node as *const lvm_str_list;
        out.push(decode_cstr((*entry).str_)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::ptr;

    fn link(head: &mut dm_list, nodes: &mut [&mut dm_list]) {
        let head_ptr = head as *mut dm_list;
        let mut prev = head_ptr;
        for node in nodes.iter_mut() {
            let node_ptr = *node as *mut dm_list;
            unsafe {
                (*prev).n = node_ptr;
                (*node_ptr).p = prev;
            }
            prev = node_ptr;
        }
        unsafe {
            (*prev).n = head_ptr;
            (*head_ptr).p = prev;
        }
    }

    fn empty_head() -> dm_list {
        dm_list {
            p: ptr::null_mut(),
            n: ptr::null_mut(),
        }
    }

    #[test]
    fn empty_list_yields_nothing() {
        let mut head = empty_head();
        link(&mut head, &mut []);
        let count = unsafe { DmListIter::new(&head) }.count();
        assert_eq!(count, 0);
    }

    #[test]
    fn single_element_yields_exactly_once() {
        let mut head = empty_head();
        let mut node = empty_head();
        link(&mut head, &mut [&mut node]);
        let nodes: Vec<_> = unsafe { DmListIter::new(&head) }.collect();
        assert_eq!(nodes, vec![&node as *const dm_list]);
    }

    #[test]
    fn traversal_preserves_list_order() {
        let mut head = empty_head();
        let mut a = empty_head();
        let mut b = empty_head();
        let mut c = empty_head();
        link(&mut head, &mut [&mut a, &mut b, &mut c]);
        let nodes: Vec<_> = unsafe { DmListIter::new(&head) }.collect();
        assert_eq!(
            nodes,
            vec![
                &a as *const dm_list,
                &b as *const dm_list,
                &c as *const dm_list
            ]
        );
    }

    #[test]
    fn str_list_round_trip() {
        let strings: Vec<CString> = ["vg0", "vg1"]
            .iter()
            .map(|s| CString::new(*s).unwrap())
            .collect();
        let mut entries: Vec<lvm_str_list> = strings
            .iter()
            .map(|s| lvm_str_list {
                list: empty_head(),
                str_: s.as_ptr(),
            })
            .collect();
        let mut head = empty_head();
        let (first, rest) = entries.split_at_mut(1);
        link(&mut head, &mut [&mut first[0].list, &mut rest[0].list]);

        let decoded = unsafe { decode_str_list(&head) }.unwrap();
        assert_eq!(decoded, vec!["vg0".to_string(), "vg1".to_string()]);
    }

    #[test]
    fn invalid_bytes_are_a_decode_error() {
        let raw = CString::new(vec![0xffu8, 0xfe]).unwrap();
        let mut entry = lvm_str_list {
            list: empty_head(),
            str_: raw.as_ptr(),
        };
        let mut head = empty_head();
        link(&mut head, &mut [&mut entry.list]);

        let err = unsafe { decode_str_list(&head) }.unwrap_err();
        assert!(matches!(err, crate::LvmError::DecodeError { .. }));
    }
}
