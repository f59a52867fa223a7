//! ALFA Photo Share - Android JNI Bindings
//!
//! Exposes the workflow to Kotlin/Java via JNI. The hosting activity
//! implements the callbacks below and forwards activity results back
//! through `onPermissionResult` / `onCaptureResult`.
//!
//! Activity methods called from Rust:
//! - `boolean hasCameraPermission()`
//! - `void requestCameraPermission(long token)`
//! - `void launchCamera(long token, String uri)`
//! - `void shareUris(String[] uris, String mimeType, boolean grantRead)`
//!
//! Those callbacks run while the app lock is held, so they must only post
//! work (start an activity, show a dialog) and never call `takePhoto`,
//! `shareDirect` or the other event entry points synchronously. The state
//! getters (`getPhotoCount`, `isExportVisible`, `getUiState`) read the last
//! published `UiState` and are safe to call from anywhere.

#![cfg(feature = "android")]

use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::sys::{jboolean, jint, jlong, jstring, JNI_FALSE, JNI_TRUE};
use jni::{JNIEnv, JavaVM};
use parking_lot::{const_mutex, Mutex};
use std::path::PathBuf;

use crate::app::{Event, Notice, PhotoShareApp, UiState};
use crate::config::ShareConfig;
use crate::error::ShareResult;
use crate::platform::{
    CameraHost, Permission, PermissionHost, RequestToken, ShareHost, ShareRequest,
};
use crate::reference::PhotoReference;

/// Host platform backed by the Java activity
pub struct JniPlatform {
    vm: JavaVM,
    activity: GlobalRef,
}

impl JniPlatform {
    pub fn new(env: &mut JNIEnv, activity: &JObject) -> ShareResult<Self> {
        Ok(Self {
            vm: env.get_java_vm()?,
            activity: env.new_global_ref(activity)?,
        })
    }
}

impl PermissionHost for JniPlatform {
    fn has_permission(&self, _permission: Permission) -> bool {
        let check = || -> ShareResult<bool> {
            let mut env = self.vm.attach_current_thread()?;
            let value = env.call_method(self.activity.as_obj(), "hasCameraPermission", "()Z", &[])?;
            Ok(value.z()?)
        };

        check().unwrap_or_else(|e| {
            log::warn!("Permission check failed: {}", e);
            false
        })
    }

    fn request_permission(&mut self, _permission: Permission, token: RequestToken) -> ShareResult<()> {
        let mut env = self.vm.attach_current_thread()?;
        env.call_method(
            self.activity.as_obj(),
            "requestCameraPermission",
            "(J)V",
            &[JValue::Long(token.0 as i64)],
        )?;
        Ok(())
    }
}

impl CameraHost for JniPlatform {
    fn launch_camera(&mut self, token: RequestToken, destination: &PhotoReference) -> ShareResult<()> {
        let mut env = self.vm.attach_current_thread()?;
        let uri = env.new_string(destination.as_str())?;
        env.call_method(
            self.activity.as_obj(),
            "launchCamera",
            "(JLjava/lang/String;)V",
            &[JValue::Long(token.0 as i64), JValue::from(&uri)],
        )?;
        Ok(())
    }
}

impl ShareHost for JniPlatform {
    fn share(&mut self, request: &ShareRequest) -> ShareResult<()> {
        let mut env = self.vm.attach_current_thread()?;

        let uris = env.new_object_array(
            request.references.len() as i32,
            "java/lang/String",
            JObject::null(),
        )?;
        for (i, reference) in request.references.iter().enumerate() {
            let uri = env.new_string(reference.as_str())?;
            env.set_object_array_element(&uris, i as i32, &uri)?;
        }
        let mime = env.new_string(&request.mime_type)?;

        env.call_method(
            self.activity.as_obj(),
            "shareUris",
            "([Ljava/lang/String;Ljava/lang/String;Z)V",
            &[
                JValue::from(&uris),
                JValue::from(&mime),
                JValue::Bool(request.grant_read as jboolean),
            ],
        )?;
        Ok(())
    }
}

// Single app instance per process
static APP: Mutex<Option<PhotoShareApp<JniPlatform>>> = const_mutex(None);

// Last state pushed to observers, readable while APP is locked
static VIEW: Mutex<Option<UiState>> = const_mutex(None);

fn publish_view(state: &UiState) {
    *VIEW.lock() = Some(state.clone());
}

fn current_view() -> Option<UiState> {
    VIEW.lock().clone()
}

fn notice_to_java(env: &mut JNIEnv, notice: Option<Notice>) -> jstring {
    match notice {
        Some(notice) => match env.new_string(notice.to_string()) {
            Ok(s) => s.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
        None => std::ptr::null_mut(),
    }
}

fn dispatch(env: &mut JNIEnv, event: Event) -> jstring {
    let notice = match APP.lock().as_mut() {
        Some(app) => app.dispatch(event),
        None => {
            log::warn!("{:?} before init", event);
            None
        }
    };
    notice_to_java(env, notice)
}

/// Initialize with the activity and its cache directory. Wipes the cache.
#[no_mangle]
pub extern "system" fn Java_dev_alfa_share_NativeShare_init(
    mut env: JNIEnv,
    _class: JClass,
    activity: JObject,
    cache_dir: JString,
    authority: JString,
) -> jboolean {
    let cache_dir: String = match env.get_string(&cache_dir) {
        Ok(s) => s.into(),
        Err(_) => return JNI_FALSE,
    };
    let authority: String = match env.get_string(&authority) {
        Ok(s) => s.into(),
        Err(_) => return JNI_FALSE,
    };

    let platform = match JniPlatform::new(&mut env, &activity) {
        Ok(p) => p,
        Err(_) => return JNI_FALSE,
    };

    let config = ShareConfig {
        authority,
        ..ShareConfig::with_cache_root(PathBuf::from(cache_dir))
    };

    match PhotoShareApp::start(platform, config) {
        Ok(mut app) => {
            app.subscribe(publish_view);
            *APP.lock() = Some(app);
            JNI_TRUE
        }
        Err(e) => {
            log::warn!("Init failed: {}", e);
            JNI_FALSE
        }
    }
}

/// "Take photo" button
#[no_mangle]
pub extern "system" fn Java_dev_alfa_share_NativeShare_takePhoto(
    mut env: JNIEnv,
    _class: JClass,
) -> jstring {
    dispatch(&mut env, Event::TakePhoto)
}

/// Permission dialog answered
#[no_mangle]
pub extern "system" fn Java_dev_alfa_share_NativeShare_onPermissionResult(
    mut env: JNIEnv,
    _class: JClass,
    token: jlong,
    granted: jboolean,
) -> jstring {
    let event = Event::PermissionResult {
        token: RequestToken(token as u64),
        granted: granted == JNI_TRUE,
    };
    dispatch(&mut env, event)
}

/// Camera activity returned
#[no_mangle]
pub extern "system" fn Java_dev_alfa_share_NativeShare_onCaptureResult(
    mut env: JNIEnv,
    _class: JClass,
    token: jlong,
    success: jboolean,
) -> jstring {
    let event = Event::CaptureResult {
        token: RequestToken(token as u64),
        success: success == JNI_TRUE,
    };
    dispatch(&mut env, event)
}

/// "Share photos" button
#[no_mangle]
pub extern "system" fn Java_dev_alfa_share_NativeShare_shareDirect(
    mut env: JNIEnv,
    _class: JClass,
) -> jstring {
    dispatch(&mut env, Event::ShareDirect)
}

/// "Share as ZIP" button
#[no_mangle]
pub extern "system" fn Java_dev_alfa_share_NativeShare_shareArchive(
    mut env: JNIEnv,
    _class: JClass,
) -> jstring {
    dispatch(&mut env, Event::ShareArchive)
}

/// Photo count for the counter label
#[no_mangle]
pub extern "system" fn Java_dev_alfa_share_NativeShare_getPhotoCount(
    _env: JNIEnv,
    _class: JClass,
) -> jint {
    current_view().map(|ui| ui.photo_count as jint).unwrap_or(0)
}

/// Whether export buttons should be shown
#[no_mangle]
pub extern "system" fn Java_dev_alfa_share_NativeShare_isExportVisible(
    _env: JNIEnv,
    _class: JClass,
) -> jboolean {
    let visible = current_view().map(|ui| ui.export_visible);
    if visible == Some(true) { JNI_TRUE } else { JNI_FALSE }
}

/// Full UI state as JSON, or null before init
#[no_mangle]
pub extern "system" fn Java_dev_alfa_share_NativeShare_getUiState(
    env: JNIEnv,
    _class: JClass,
) -> jstring {
    let json = current_view().and_then(|ui| match serde_json::to_string(&ui) {
        Ok(json) => Some(json),
        Err(e) => {
            log::warn!("UI state not serializable: {}", e);
            None
        }
    });
    match json.map(|json| env.new_string(json)) {
        Some(Ok(s)) => s.into_raw(),
        _ => std::ptr::null_mut(),
    }
}

/// JPEG preview of the latest photo, or null
#[no_mangle]
pub extern "system" fn Java_dev_alfa_share_NativeShare_getLatestPreview(
    env: JNIEnv,
    _class: JClass,
) -> jni::sys::jbyteArray {
    // held for the whole of an event dispatch
    let Some(guard) = APP.try_lock() else {
        log::warn!("Preview requested while an event is being handled");
        return std::ptr::null_mut();
    };
    let preview = guard.as_ref().and_then(|app| app.latest_preview().ok().flatten());
    drop(guard);
    match preview {
        Some(bytes) => match env.byte_array_from_slice(&bytes) {
            Ok(arr) => arr.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
        None => std::ptr::null_mut(),
    }
}
