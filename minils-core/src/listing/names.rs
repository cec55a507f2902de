use std::ffi::CStr;
use std::io;

/// Reverse lookup of numeric owner and group ids.
///
/// `Ok(None)` means the database has no entry for the id. The caller treats
/// that the same as a failed lookup: the record cannot be formatted.
pub trait NameService {
    fn user_name(&self, uid: u32) -> io::Result<Option<String>>;
    fn group_name(&self, gid: u32) -> io::Result<Option<String>>;
}

/// Lookups against the system passwd and group databases
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNames;

const FALLBACK_BUFFER_LEN: usize = 1024;
const MAX_BUFFER_LEN: usize = 1 << 20;

fn initial_buffer_len(name: libc::c_int) -> usize {
    match unsafe { libc::sysconf(name) } {
        n if n > 0 => n as usize,
        _ => FALLBACK_BUFFER_LEN,
    }
}

/// Drive one of the `get*_r` calls, growing the scratch buffer on ERANGE.
///
/// `call` returns the status code and a pointer to the name inside the
/// buffer, or null when the id has no entry.
fn reentrant_lookup<F>(size_hint: libc::c_int, mut call: F) -> Result<Option<String>, io::Error>
where
    F: FnMut(&mut [libc::c_char]) -> (libc::c_int, *const libc::c_char),
{
    let mut buf = vec![0 as libc::c_char; initial_buffer_len(size_hint)];
    loop {
        let (rc, name) = call(buf.as_mut_slice());
        if rc == libc::ERANGE && buf.len() < MAX_BUFFER_LEN {
            let grown = buf.len() * 2;
            buf.resize(grown, 0);
            continue;
        }
        if rc != 0 {
            return Err(io::Error::from_raw_os_error(rc));
        }
        if name.is_null() {
            return Ok(None);
        }
        // SAFETY: the name points into `buf`, which is still alive and untouched
        let name = unsafe { CStr::from_ptr(name) };
        return Ok(Some(name.to_string_lossy().into_owned()));
    }
}

impl NameService for SystemNames {
    fn user_name(&self, uid: u32) -> io::Result<Option<String>> {
        reentrant_lookup(libc::_SC_GETPW_R_SIZE_MAX, |buf| {
            let mut passwd: libc::passwd = unsafe { std::mem::zeroed() };
            let mut result: *mut libc::passwd = std::ptr::null_mut();
            let rc = unsafe {
                libc::getpwuid_r(uid as libc::uid_t, &mut passwd, buf.as_mut_ptr(), buf.len(), &mut result)
            };
            let name = if result.is_null() { std::ptr::null() } else { passwd.pw_name as *const libc::c_char };
            (rc, name)
        })
    }

    fn group_name(&self, gid: u32) -> io::Result<Option<String>> {
        reentrant_lookup(libc::_SC_GETGR_R_SIZE_MAX, |buf| {
            let mut group: libc::group = unsafe { std::mem::zeroed() };
            let mut result: *mut libc::group = std::ptr::null_mut();
            let rc = unsafe {
                libc::getgrgid_r(gid as libc::gid_t, &mut group, buf.as_mut_ptr(), buf.len(), &mut result)
            };
            let name = if result.is_null() { std::ptr::null() } else { group.gr_name as *const libc::c_char };
            (rc, name)
        })
    }
}
