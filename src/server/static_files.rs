pub const INDEX_HTML: &str = r#"<!doctype html>
<html lang="ko">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>EV Map</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
  <link rel="stylesheet" href="/style.css" />
</head>
<body>
  <header>
    <div>
      <h1>EV Map</h1>
      <p>KEPCO &amp; VWorld Open API</p>
    </div>
    <div id="status">데이터 로드 준비 중...</div>
  </header>
  <div id="map"></div>
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <script src="/app.js"></script>
</body>
</html>
"#;

pub const STYLE_CSS: &str = r#"html, body { margin: 0; height: 100%; font-family: system-ui, sans-serif; background: #f9fafb; }
body { display: flex; flex-direction: column; overflow: hidden; }
header { padding: 16px; background: #f43f5e; color: #fff; display: flex; justify-content: space-between; align-items: center; box-shadow: 0 2px 4px rgba(0,0,0,.15); z-index: 1000; }
header h1 { margin: 0; font-size: 20px; }
header p { margin: 0; font-size: 10px; opacity: .7; }
#status { background: rgba(255,255,255,.2); padding: 6px 16px; border-radius: 9999px; font-size: 12px; font-weight: 600; }
#map { flex: 1; width: 100%; }
.cluster { background: rgba(225,29,72,.75); color: #fff; border-radius: 50%; text-align: center; font-weight: 700; border: 3px solid rgba(255,255,255,.8); }
"#;

pub const APP_JS: &str = r#"(function () {
  const statusEl = document.getElementById('status');
  let map = null;
  let overlay = null;
  let centered = false;

  function clusterIcon(count) {
    const size = count < 10 ? 30 : count < 100 ? 40 : 50;
    return L.divIcon({
      html: '<div style="line-height:' + (size - 6) + 'px">' + count + '</div>',
      className: 'cluster',
      iconSize: [size, size],
    });
  }

  function draw(view) {
    if (!map) {
      map = L.map('map').setView([view.center.lat, view.center.lon], view.zoom);
      L.tileLayer(view.tile_url).addTo(map);
      map.on('zoomend', refresh);
    }
    if (overlay) map.removeLayer(overlay);
    overlay = L.layerGroup();
    for (const item of view.items) {
      if (item.kind === 'marker') {
        const icon = L.icon({
          iconUrl: item.icon.icon_url,
          shadowUrl: item.icon.shadow_url,
          iconSize: item.icon.icon_size,
          iconAnchor: item.icon.icon_anchor,
        });
        L.marker([item.position.lat, item.position.lon], { icon })
          .bindPopup(item.popup_html)
          .addTo(overlay);
      } else {
        const b = item.bounds;
        L.marker([item.center.lat, item.center.lon], { icon: clusterIcon(item.count) })
          .on('click', () => map.fitBounds([[b.south_west.lat, b.south_west.lon], [b.north_east.lat, b.north_east.lon]]))
          .addTo(overlay);
      }
    }
    overlay.addTo(map);
    if (!centered && view.marker_count > 0) {
      map.panTo([view.center.lat, view.center.lon]);
      centered = true;
    }
  }

  async function refresh() {
    const zoom = map ? map.getZoom() : '';
    const res = await fetch('/api/map' + (zoom === '' ? '' : '?zoom=' + zoom));
    const view = await res.json();
    statusEl.textContent = view.status.message;
    draw(view);
    return view;
  }

  async function follow() {
    try {
      const view = await refresh();
      if (!view.status.finished || !view.ready) setTimeout(follow, 1000);
    } catch (e) {
      statusEl.textContent = '서버 연결 실패';
    }
  }

  follow();
})();
"#;
