//! Planning steps 1–5 from §4.5: validate roots, lay out per-project
//! folders (nesting streaming under `STREAMING` when the roots coincide),
//! purge-or-fail on `overwrite_existing`, copy the DVD image and ISO, and
//! create each menu page's temp/final preservation-master folders.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::MenuLayout;
use crate::error::{ArchiverError, ArchiverResult};

use super::naming::menu_dir_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreservationCodec {
    None,
    Copy,
    Ffv1,
    H264TenBitAllI,
    H265TenBitAllI,
}

#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub dvd_name: String,
    pub dvd_source_folder: PathBuf,
    pub iso_source_folder: PathBuf,
    pub archive_root: PathBuf,
    pub streaming_root: PathBuf,
    pub menu_layout: MenuLayout,
    pub overwrite_existing: bool,
    pub preservation_codec: PreservationCodec,
    pub is_blu_ray: bool,
}

#[derive(Debug, Clone)]
pub struct MenuPlan {
    pub index: usize,
    pub dir_name: String,
    pub temp_dir: PathBuf,
    pub final_dir: PathBuf,
    pub streaming_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub project_archive_dir: PathBuf,
    pub project_streaming_dir: PathBuf,
    pub dvd_image_dir: PathBuf,
    pub iso_image_dir: PathBuf,
    pub preservation_master_dir: PathBuf,
    pub menus: Vec<MenuPlan>,
}

pub fn plan(request: &BuildRequest) -> ArchiverResult<BuildPlan> {
    require_exists(&request.dvd_source_folder, "dvd source folder")?;
    require_exists(&request.iso_source_folder, "iso source folder")?;
    require_exists(&request.archive_root, "archive root")?;
    require_exists(&request.streaming_root, "streaming root")?;

    let project_archive_dir = request.archive_root.join(&request.dvd_name);
    let roots_coincide = request.archive_root == request.streaming_root;
    let project_streaming_dir = if roots_coincide {
        project_archive_dir.join("STREAMING")
    } else {
        request.streaming_root.join(&request.dvd_name)
    };

    if request.overwrite_existing {
        purge(&project_archive_dir)?;
        purge(&project_streaming_dir)?;
    } else if project_archive_dir.exists() || project_streaming_dir.exists() {
        return Err(ArchiverError::Preflight(format!(
            "project folders for '{}' already exist; pass overwrite_existing to replace them",
            request.dvd_name
        )));
    }

    let codec_suffix = match request.preservation_codec {
        PreservationCodec::None | PreservationCodec::Copy => "copy",
        PreservationCodec::Ffv1 => "ffv1",
        PreservationCodec::H264TenBitAllI => "h264",
        PreservationCodec::H265TenBitAllI => "h265",
    };
    let preservation_master_dir = project_archive_dir.join(format!("preservation_master_{codec_suffix}"));
    let dvd_image_dir = project_archive_dir.join("dvd_image");
    let iso_image_dir = project_archive_dir.join("iso_image");

    fs::create_dir_all(&dvd_image_dir)?;
    fs::create_dir_all(&iso_image_dir)?;
    fs::create_dir_all(&project_streaming_dir)?;
    fs::create_dir_all(&preservation_master_dir)?;

    copy_tree(&request.dvd_source_folder, &dvd_image_dir)?;
    copy_tree(&request.iso_source_folder, &iso_image_dir)?;

    let mut menus = Vec::with_capacity(request.menu_layout.pages.len());
    for (index, page) in request.menu_layout.pages.iter().enumerate() {
        let dir_name = menu_dir_name(index, &page.title);
        let temp_dir = preservation_master_dir.join(format!("{dir_name}_temp"));
        let final_dir = preservation_master_dir.join(&dir_name);
        let streaming_dir = project_streaming_dir.join(&dir_name);
        fs::create_dir_all(&temp_dir)?;
        fs::create_dir_all(&final_dir)?;
        fs::create_dir_all(&streaming_dir)?;
        menus.push(MenuPlan { index, dir_name, temp_dir, final_dir, streaming_dir });
    }

    Ok(BuildPlan { project_archive_dir, project_streaming_dir, dvd_image_dir, iso_image_dir, preservation_master_dir, menus })
}

fn require_exists(path: &Path, label: &str) -> ArchiverResult<()> {
    if !path.exists() {
        return Err(ArchiverError::Preflight(format!("{label} {} does not exist", path.display())));
    }
    Ok(())
}

fn purge(dir: &Path) -> ArchiverResult<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    Ok(())
}

fn copy_tree(src: &Path, dest: &Path) -> ArchiverResult<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let path = entry.path();
        let target = dest.join(entry.file_name());
        if path.is_dir() {
            fs::create_dir_all(&target)?;
            copy_tree(&path, &target)?;
        } else {
            fs::copy(&path, &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MenuPage, VideoRef};

    fn request(archive_root: &Path, streaming_root: &Path, overwrite: bool) -> BuildRequest {
        BuildRequest {
            dvd_name: "MyMovie".to_string(),
            dvd_source_folder: archive_root.to_path_buf(),
            iso_source_folder: archive_root.to_path_buf(),
            archive_root: archive_root.to_path_buf(),
            streaming_root: streaming_root.to_path_buf(),
            menu_layout: crate::domain::MenuLayout {
                pages: vec![MenuPage { title: "Intro".to_string(), videos: Vec::<VideoRef>::new() }],
            },
            overwrite_existing: overwrite,
            preservation_codec: PreservationCodec::Copy,
            is_blu_ray: false,
        }
    }

    #[test]
    fn nests_streaming_under_project_when_roots_coincide() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("dummy.vob"), b"x").unwrap();
        let build_plan = plan(&request(root.path(), root.path(), false)).unwrap();
        assert_eq!(build_plan.project_streaming_dir, build_plan.project_archive_dir.join("STREAMING"));
        assert_eq!(build_plan.menus.len(), 1);
        assert_eq!(build_plan.menus[0].dir_name, "01_Intro");
    }

    #[test]
    fn fails_when_project_exists_and_overwrite_is_false() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("dummy.vob"), b"x").unwrap();
        plan(&request(root.path(), root.path(), false)).unwrap();
        assert!(plan(&request(root.path(), root.path(), false)).is_err());
    }

    #[test]
    fn overwrite_existing_purges_prior_contents() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("dummy.vob"), b"x").unwrap();
        let first = plan(&request(root.path(), root.path(), false)).unwrap();
        std::fs::write(first.project_archive_dir.join("stray.txt"), b"leftover").unwrap();

        plan(&request(root.path(), root.path(), true)).unwrap();
        assert!(!first.project_archive_dir.join("stray.txt").exists());
    }
}
