//! Builders for the circular `dm_list` chains handed across the FFI
//! boundary. Every allocation backing a list (head sentinel, entry nodes,
//! strings) is owned by one of these structs so the pointers stay valid for
//! exactly as long as the owning handle retains the list.

use std::ffi::CString;
use std::ptr;

use lvm2_sys::{dm_list, lvm_str_list};

pub(crate) fn sentinel() -> Box<dm_list> {
    Box::new(dm_list {
        p: ptr::null_mut(),
        n: ptr::null_mut(),
    })
}

/// Close the chain: head -> nodes[0] -> ... -> nodes[last] -> head.
/// With no nodes the head points back at itself, the canonical empty list.
pub(crate) fn link(head: *mut dm_list, nodes: &[*mut dm_list]) {
    unsafe {
        let mut prev = head;
        for &node in nodes {
            (*prev).n = node;
            (*node).p = prev;
            prev = node;
        }
        (*prev).n = head;
        (*head).p = prev;
    }
}

/// A `lvm_str_list` chain.
pub(crate) struct StrList {
    head: Box<dm_list>,
    _nodes: Vec<Box<lvm_str_list>>,
    _strings: Vec<CString>,
}

impl StrList {
    pub(crate) fn new(items: &[Vec<u8>]) -> StrList {
        let strings: Vec<CString> = items
            .iter()
            .map(|b| CString::new(b.clone()).expect("mock string contains nul"))
            .collect();
        let mut nodes: Vec<Box<lvm_str_list>> = strings
            .iter()
            .map(|s| {
                Box::new(lvm_str_list {
                    list: dm_list {
                        p: ptr::null_mut(),
                        n: ptr::null_mut(),
                    },
                    str_: s.as_ptr(),
                })
            })
            .collect();
        let mut head = sentinel();
        let node_ptrs: Vec<*mut dm_list> = nodes
            .iter_mut()
            .map(|n| &mut n.list as *mut dm_list)
            .collect();
        link(&mut *head as *mut dm_list, &node_ptrs);
        StrList {
            head,
            _nodes: nodes,
            _strings: strings,
        }
    }

    pub(crate) fn head_ptr(&self) -> *mut dm_list {
        &*self.head as *const dm_list as *mut dm_list
    }
}
